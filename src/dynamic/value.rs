use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::codepoint::RawValue;
use crate::error::ConvertError;
use crate::value::{EncodeContext, FixedValue, ValueKind};

/// Fields of a dynamic record, ordered by name.
pub type Object = BTreeMap<SmolStr, Value>;

// ─── Number ─────────────────────────────────────────────────────────────────

/// A numeric column. `Int` columns decode to `I64`, `Uint` to `U64`,
/// `Float` to `F64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::I64(i) => i as f64,
            Number::U64(u) => u as f64,
            Number::F64(f) => f,
        }
    }

    /// Integral floats convert when they are in range.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::I64(i) => Some(i),
            Number::U64(u) => u.try_into().ok(),
            Number::F64(f) => integral(f, i64::MIN as f64, i64::MAX as f64).map(|f| f as i64),
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            Number::I64(i) => i.try_into().ok(),
            Number::U64(u) => Some(u),
            Number::F64(f) => integral(f, 0.0, u64::MAX as f64).map(|f| f as u64),
        }
    }

    /// Column text: integers in full, floats with `precision` fractional digits.
    fn render(self, precision: usize) -> String {
        match self {
            Number::I64(i) => i.to_string(),
            Number::U64(u) => u.to_string(),
            Number::F64(f) => format!("{f:.precision$}"),
        }
    }
}

fn integral(f: f64, min: f64, max: f64) -> Option<f64> {
    (f.trunc() == f && (min..=max).contains(&f)).then_some(f)
}

macro_rules! number_from {
    ($variant:ident as $wide:ty => $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::$variant(<$wide>::from(n)))
                }
            }
        )+
    };
}

number_from!(I64 as i64 => i8, i16, i32, i64);
number_from!(U64 as u64 => u8, u16, u32, u64);
number_from!(F64 as f64 => f32, f64);

// ─── Value ──────────────────────────────────────────────────────────────────

/// A record, or one of its columns, whose shape is only known at run time.
///
/// Serializes to and deserializes from plain JSON-like data: objects map
/// onto records, arrays onto lists of records, scalars onto columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Str(SmolStr),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        let Value::Str(s) = self else { return None };
        Some(s.as_str())
    }

    pub fn as_f64(&self) -> Option<f64> {
        let Value::Number(n) = self else { return None };
        Some(n.as_f64())
    }

    pub fn as_i64(&self) -> Option<i64> {
        let Value::Number(n) = self else { return None };
        n.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        let Value::Number(n) = self else { return None };
        n.as_u64()
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        let Value::Array(items) = self else { return None };
        Some(items.as_slice())
    }

    /// Column `key` of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let Value::Object(record) = self else { return None };
        record.get(key)
    }

    /// Short description used in error messages.
    pub fn type_desc(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(SmolStr::new(s))
    }
}

// ─── Column conversion ──────────────────────────────────────────────────────

/// Scalars render as text; arrays and objects have no column form. Decoding
/// always yields a string, since a column carries no type information.
impl FixedValue for Value {
    const KIND: ValueKind = ValueKind::Dynamic;

    fn encode_fixed(&self, ctx: &EncodeContext<'_>) -> Result<Cow<'_, [u8]>, ConvertError> {
        match self {
            Value::Null => Ok(Cow::Borrowed(&[])),
            Value::Bool(b) => b.encode_fixed(ctx),
            Value::Number(n) => Ok(Cow::Owned(n.render(ctx.config.float_precision).into_bytes())),
            Value::Str(s) => Ok(Cow::Borrowed(s.as_bytes())),
            Value::Array(_) | Value::Object(_) => Err(ConvertError::Unsupported {
                type_name: self.type_desc(),
            }),
        }
    }

    fn decode_fixed(&mut self, raw: &RawValue<'_>) -> Result<(), ConvertError> {
        *self = Value::Str(SmolStr::new(raw.as_str()?));
        Ok(())
    }
}
