use std::borrow::Cow;

use smol_str::SmolStr;

use super::{EncodeContext, FixedValue, ValueKind};
use crate::codepoint::RawValue;
use crate::error::ConvertError;

// ─── Text ───────────────────────────────────────────────────────────────────

impl FixedValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn encode_fixed(&self, _ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
        self.clear();
        self.push_str(raw.as_str()?);
        Ok(())
    }
}

impl FixedValue for SmolStr {
    const KIND: ValueKind = ValueKind::Text;

    fn encode_fixed(&self, _ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
        *self = SmolStr::new(raw.as_str()?);
        Ok(())
    }
}

// ─── Integers ───────────────────────────────────────────────────────────────

macro_rules! impl_integer {
    ($kind:expr, $check:path => $($ty:ty),+ $(,)?) => {
        $(
            impl FixedValue for $ty {
                const KIND: ValueKind = $kind;

                fn encode_fixed(&self, _ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
                    Ok(Cow::Owned(self.to_string().into_bytes()))
                }

                fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
                    if raw.is_empty() {
                        *self = 0;
                        return Ok(());
                    }
                    $check(raw)?;
                    *self = raw.as_str()?.parse()?;
                    Ok(())
                }
            }
        )+
    };
}

impl_integer!(ValueKind::Int, accept_sign => i8, i16, i32, i64, isize);
impl_integer!(ValueKind::Uint, reject_sign => u8, u16, u32, u64, usize);

#[inline]
fn accept_sign(_raw: &RawValue<'_>) -> Result<(), ConvertError> {
    Ok(())
}

/// std's unsigned parsers accept a leading '+'.
fn reject_sign(raw: &RawValue<'_>) -> Result<(), ConvertError> {
    match raw.as_bytes().first() {
        Some(b'+') | Some(b'-') => Err(ConvertError::custom(format!(
            "unexpected sign in unsigned value {:?}",
            String::from_utf8_lossy(raw.as_bytes())
        ))),
        _ => Ok(()),
    }
}

// ─── Floats ─────────────────────────────────────────────────────────────────

macro_rules! impl_float {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FixedValue for $ty {
                const KIND: ValueKind = ValueKind::Float;

                fn encode_fixed(&self, ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
                    let precision = ctx.config.float_precision;
                    Ok(Cow::Owned(format!("{:.*}", precision, self).into_bytes()))
                }

                fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
                    *self = if raw.is_empty() { 0.0 } else { raw.as_str()?.parse()? };
                    Ok(())
                }
            }
        )+
    };
}

impl_float!(f32, f64);

// ─── Bool ───────────────────────────────────────────────────────────────────

/// The accepted spellings: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(text: &str) -> Result<bool, ConvertError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(ConvertError::Bool(SmolStr::new(other))),
    }
}

impl FixedValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn encode_fixed(&self, _ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
        let word: &'static [u8] = if *self { b"true" } else { b"false" };
        Ok(Cow::Borrowed(word))
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
        let text = raw.as_str()?.trim_matches(' ');
        *self = if text.is_empty() { false } else { parse_bool(text)? };
        Ok(())
    }
}
