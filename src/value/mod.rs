use std::borrow::Cow;

use crate::codepoint::RawValue;
use crate::config::FormatConfig;
use crate::error::ConvertError;
use crate::layout::{LayoutCache, Record};
use crate::tag::DEFAULT_PAD;

mod float;
mod primitive;

pub use float::Float;

// ─── ValueKind ──────────────────────────────────────────────────────────────

/// Semantic kind of a field type, fixed per type and read once when a
/// layout is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Int,
    Uint,
    Float,
    Bool,
    /// A nested record written into the field's interval as a sub-line.
    Record,
    /// `Option<T>`: absent encodes as an empty, fully padded interval.
    Optional,
    /// A user type converting itself.
    Custom,
    /// `dynamic::Value`, typed at run time.
    Dynamic,
}

impl ValueKind {
    /// Integer, unsigned and floating point fields take the configured
    /// numeric format when their tag sets none.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Uint | ValueKind::Float)
    }
}

// ─── EncodeContext ──────────────────────────────────────────────────────────

/// What a converter may look at while encoding one field.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub config: &'a FormatConfig,
    /// Width of the field's interval, in positions.
    pub width: usize,
}

impl<'a> EncodeContext<'a> {
    pub fn new(config: &'a FormatConfig, width: usize) -> Self {
        EncodeContext { config, width }
    }
}

// ─── FixedValue ─────────────────────────────────────────────────────────────

/// A type that can live in a fixed-width column.
///
/// Implement it for your own types to take over conversion completely; the
/// provided impls cover strings, integers, floats, `bool`, `Option<T>` and
/// records declared with [`record!`](crate::record).
///
/// ```
/// use std::borrow::Cow;
/// use fixedwidth::{ConvertError, EncodeContext, FixedValue, RawValue};
///
/// #[derive(Default)]
/// struct Upper(String);
///
/// impl FixedValue for Upper {
///     fn encode_fixed(&self, _: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
///         Ok(Cow::Owned(self.0.to_uppercase().into_bytes()))
///     }
///
///     fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
///         self.0 = raw.as_str()?.to_lowercase();
///         Ok(())
///     }
/// }
/// ```
pub trait FixedValue {
    const KIND: ValueKind = ValueKind::Custom;

    /// Whether the interval is trimmed of pad characters before
    /// `decode_fixed` sees it. Nested records keep their interval intact.
    const TRIM: bool = true;

    fn encode_fixed(&self, ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError>;

    /// Overwrite `self` from an already trimmed interval. An empty interval
    /// means the column carried no data.
    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError>;
}

// ─── Option<T> ──────────────────────────────────────────────────────────────

impl<T: FixedValue + Default> FixedValue for Option<T> {
    const KIND: ValueKind = ValueKind::Optional;
    const TRIM: bool = T::TRIM;

    fn encode_fixed(&self, ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
        match self {
            Some(value) => value.encode_fixed(ctx),
            None => Ok(Cow::Borrowed(&[])),
        }
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
        // untrimmed intervals (nested records) are absent when blank
        let absent = if T::TRIM {
            raw.is_empty()
        } else {
            raw.as_bytes().iter().all(|&b| b == DEFAULT_PAD)
        };
        if absent {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).decode_fixed(raw)
    }
}

// ─── Nested records ─────────────────────────────────────────────────────────

/// Encode a nested record into a sub-line using its own cached layout.
/// Used by the [`record!`](crate::record) expansion.
pub fn encode_nested<R: Record>(
    record: &R,
    ctx: &EncodeContext<'_>,
) -> Result<Cow<'static, [u8]>, ConvertError> {
    let layout = LayoutCache::global().layout_of::<R>();
    let line = layout.encode(record, ctx.config)?;
    Ok(Cow::Owned(line))
}

/// Decode a nested record from its untrimmed interval. Positions inside the
/// interval are relative to the interval's first column.
pub fn decode_nested<R: Record>(record: &mut R, raw: &RawValue<'_>) -> Result<(), ConvertError> {
    let layout = LayoutCache::global().layout_of::<R>();
    layout.decode_into(raw, record)?;
    Ok(())
}
