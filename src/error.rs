// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use std::num::{ParseFloatError, ParseIntError};
use std::str::Utf8Error;
use thiserror::Error;

pub type Result<T, E = FixedWidthError> = std::result::Result<T, E>;

/// Everything that can go wrong while encoding or decoding a line.
///
/// Invalid field tags are deliberately absent: a field whose tag does not
/// parse is skipped, never reported.
#[derive(Debug, Error)]
pub enum FixedWidthError {
    #[error("invalid target: {type_desc} is not a record or a collection of records")]
    InvalidTarget { type_desc: SmolStr },

    #[error("cannot decode {value:?} into field {record}.{field} of type {type_name}: {source}")]
    Decode {
        value: String,
        type_name: &'static str,
        record: SmolStr,
        field: SmolStr,
        #[source]
        source: ConvertError,
    },

    #[error("cannot encode field {record}.{field} of type {type_name}: {source}")]
    Encode {
        type_name: &'static str,
        record: SmolStr,
        field: SmolStr,
        #[source]
        source: ConvertError,
    },

    #[error("cannot encode unsupported type {type_name} in field {record}.{field}")]
    UnsupportedType {
        type_name: &'static str,
        record: SmolStr,
        field: SmolStr,
    },

    #[error("invalid codepoint at byte {offset}")]
    InvalidCodepoint { offset: usize },

    #[error("value {value:?} of field {field} is too long; {len} length where field is only {width} wide")]
    Overflow {
        field: SmolStr,
        value: String,
        len: usize,
        width: usize,
    },

    #[error("pad byte {pad:#04x} is not ASCII")]
    InvalidPad { pad: u8 },

    #[error("line exceeds the maximum length of {max} bytes")]
    LineTooLong { max: usize },

    #[error("no more records")]
    EndOfData,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single value converter, before the layout attaches the
/// record and field it happened in.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid integer: {0}")]
    Int(#[from] ParseIntError),
    #[error("invalid float: {0}")]
    Float(#[from] ParseFloatError),
    #[error("invalid boolean {0:?}")]
    Bool(SmolStr),
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("unsupported type {type_name}")]
    Unsupported { type_name: &'static str },
    #[error(transparent)]
    Nested(Box<FixedWidthError>),
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl ConvertError {
    /// Wrap an error raised by a user-defined converter.
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ConvertError::Custom(err.into())
    }
}

impl From<FixedWidthError> for ConvertError {
    fn from(err: FixedWidthError) -> Self {
        ConvertError::Nested(Box::new(err))
    }
}
