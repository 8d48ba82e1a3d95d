use std::borrow::Cow;

use super::{EncodeContext, FixedValue, ValueKind};
use crate::codepoint::RawValue;
use crate::error::ConvertError;

/// A float that spends the whole column on precision.
///
/// Encoding writes as many fractional digits as fit in the field's width
/// and fails when even the integral part does not fit, or when the value
/// is infinite or NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Float(pub f64);

impl Float {
    /// Characters taken by the integral part, sign and decimal point.
    /// Drops below 2 for magnitudes under 0.1, leaving room for more digits.
    /// Finite values only.
    fn integral_len(self) -> i64 {
        let f = self.0;
        if f > 0.0 {
            (f.log10() as i64).saturating_add(2)
        } else if f < 0.0 {
            (f.abs().log10() as i64).saturating_add(3)
        } else {
            2
        }
    }
}

impl From<f64> for Float {
    fn from(value: f64) -> Self {
        Float(value)
    }
}

impl From<Float> for f64 {
    fn from(value: Float) -> Self {
        value.0
    }
}

impl FixedValue for Float {
    const KIND: ValueKind = ValueKind::Float;

    fn encode_fixed(&self, ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
        if !self.0.is_finite() {
            return Err(ConvertError::custom(format!("{} has no fixed-point form", self.0)));
        }
        let len = self.integral_len();
        let width = i64::try_from(ctx.width).unwrap_or(i64::MAX);
        if len - 1 > width {
            return Err(ConvertError::custom(format!(
                "{} does not fit in {} columns even without a fractional part",
                self.0, ctx.width
            )));
        }
        let precision = (width - len).max(0) as usize;
        Ok(Cow::Owned(format!("{:.*}", precision, self.0).into_bytes()))
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
        self.0 = if raw.is_empty() { 0.0 } else { raw.as_str()?.parse()? };
        Ok(())
    }
}
