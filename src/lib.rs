//! Fixed-width text lines to and from typed records.
//!
//! Each field of a record claims a column interval with a tag of the form
//! `start,end[,alignment[,pad]]` (1-based, inclusive). Decoding slices and
//! trims every interval and converts it; encoding renders every field,
//! pads it into its interval and joins lines with a terminator.
//!
//! ```
//! use fixedwidth::{record, FormatConfig};
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Item {
//!         pub sku: String = "1,6",
//!         pub qty: u32 = "7,10,right,0",
//!         pub label: String = "11,16",
//!     }
//! }
//!
//! let items: Vec<Item> = fixedwidth::from_slice_all(b"A-00100012Snow\nB-00200003Ice").unwrap();
//! assert_eq!(items[0], Item { sku: "A-0010".into(), qty: 12, label: "Snow".into() });
//!
//! let line = fixedwidth::to_vec(&items[1]).unwrap();
//! assert_eq!(line, b"B-00200003Ice   ");
//!
//! // Positions can count characters instead of bytes.
//! let config = FormatConfig::default().with_codepoint_indices(true);
//! let item: Item = fixedwidth::from_slice_with("☃-00000001Ünï".as_bytes(), &config).unwrap();
//! assert_eq!(item.label, "Ünï");
//! ```

pub mod codepoint;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod layout;
pub mod line_builder;
mod record_macro;
pub mod stream;
pub mod tag;
pub mod value;

use std::io::Write;

pub use codepoint::RawValue;
pub use config::FormatConfig;
pub use error::{ConvertError, FixedWidthError, Result};
pub use layout::{FieldDecl, FieldSpec, LayoutCache, Record, RecordLayout};
pub use line_builder::LineBuilder;
pub use stream::{Decoder, Encoder, LineReader, Records};
pub use tag::{parse_tag, Alignment, FieldFormat, Tag};
pub use value::{EncodeContext, FixedValue, Float, ValueKind};

// ─── Decode ─────────────────────────────────────────────────────────────────

/// Decode the first line of `input`. Empty input is
/// [`FixedWidthError::EndOfData`].
pub fn from_slice<T: Record>(input: &[u8]) -> Result<T> {
    from_slice_with(input, &FormatConfig::default())
}

pub fn from_slice_with<T: Record>(input: &[u8], config: &FormatConfig) -> Result<T> {
    Decoder::with_config(input, config.clone())
        .decode()?
        .ok_or(FixedWidthError::EndOfData)
}

pub fn from_str<T: Record>(input: &str) -> Result<T> {
    from_slice(input.as_bytes())
}

/// Decode every line of `input`.
pub fn from_slice_all<T: Record>(input: &[u8]) -> Result<Vec<T>> {
    from_slice_all_with(input, &FormatConfig::default())
}

pub fn from_slice_all_with<T: Record>(input: &[u8], config: &FormatConfig) -> Result<Vec<T>> {
    Decoder::with_config(input, config.clone()).decode_all()
}

// ─── Encode ─────────────────────────────────────────────────────────────────

/// Encode one record as a line without terminator.
pub fn to_vec<T: Record>(record: &T) -> Result<Vec<u8>> {
    to_vec_with(record, &FormatConfig::default())
}

pub fn to_vec_with<T: Record>(record: &T, config: &FormatConfig) -> Result<Vec<u8>> {
    LayoutCache::global().layout_of::<T>().encode(record, config)
}

/// Encode records as lines joined by the terminator, none after the last.
pub fn to_vec_all<T: Record>(records: &[T]) -> Result<Vec<u8>> {
    to_vec_all_with(records, &FormatConfig::default())
}

pub fn to_vec_all_with<T: Record>(records: &[T], config: &FormatConfig) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_config(Vec::new(), config.clone());
    encoder.encode_all(records)?;
    encoder.into_inner()
}

pub fn to_writer<W: Write, T: Record>(writer: W, record: &T) -> Result<()> {
    to_writer_with(writer, record, &FormatConfig::default())
}

pub fn to_writer_with<W: Write, T: Record>(writer: W, record: &T, config: &FormatConfig) -> Result<()> {
    let mut encoder = Encoder::with_config(writer, config.clone());
    encoder.encode(record)
}
