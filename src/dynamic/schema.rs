use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::value::{Number, Object, Value};
use crate::codepoint::RawValue;
use crate::config::FormatConfig;
use crate::error::{ConvertError, FixedWidthError, Result};
use crate::layout::{FieldAccess, FieldDecl, RecordLayout};
use crate::stream::LineReader;
use crate::value::{EncodeContext, FixedValue, ValueKind};

// ─── FieldKind ──────────────────────────────────────────────────────────────

/// Column type of a dynamic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Int,
    Uint,
    Float,
    Bool,
}

impl FieldKind {
    fn value_kind(self) -> ValueKind {
        match self {
            FieldKind::Text => ValueKind::Text,
            FieldKind::Int => ValueKind::Int,
            FieldKind::Uint => ValueKind::Uint,
            FieldKind::Float => ValueKind::Float,
            FieldKind::Bool => ValueKind::Bool,
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Int => "int",
            FieldKind::Uint => "uint",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
        }
    }

    /// Decode a trimmed column. Empty columns give the kind's zero value.
    fn decode(self, raw: &RawValue<'_>) -> std::result::Result<Value, ConvertError> {
        Ok(match self {
            FieldKind::Text => Value::Str(SmolStr::new(raw.as_str()?)),
            FieldKind::Int => {
                let mut n = 0i64;
                n.decode_fixed(raw)?;
                Value::Number(Number::I64(n))
            }
            FieldKind::Uint => {
                let mut n = 0u64;
                n.decode_fixed(raw)?;
                Value::Number(Number::U64(n))
            }
            FieldKind::Float => {
                let mut n = 0f64;
                n.decode_fixed(raw)?;
                Value::Number(Number::F64(n))
            }
            FieldKind::Bool => {
                let mut b = false;
                b.decode_fixed(raw)?;
                Value::Bool(b)
            }
        })
    }
}

// ─── Schema ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: SmolStr,
    pub tag: SmolStr,
    #[serde(default)]
    pub kind: FieldKind,
}

/// A record shape declared at run time, e.g. loaded from JSON:
///
/// ```
/// use fixedwidth::dynamic::{Schema, Value};
/// use fixedwidth::FormatConfig;
///
/// let schema: Schema = serde_json::from_str(r#"{
///     "name": "Person",
///     "fields": [
///         { "name": "name", "tag": "1,5" },
///         { "name": "age", "tag": "6,8,right", "kind": "uint" }
///     ]
/// }"#).unwrap();
///
/// let person = schema.decode_line(b"ann   31", &FormatConfig::default()).unwrap();
/// assert_eq!(person.get("name"), Some(&Value::from("ann")));
/// assert_eq!(person.get("age").and_then(Value::as_u64), Some(31));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: SmolStr,
    pub fields: Vec<SchemaField>,
    #[serde(skip)]
    layout: OnceLock<Arc<RecordLayout<Object>>>,
}

impl Schema {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Schema {
            name: name.into(),
            fields: Vec::new(),
            layout: OnceLock::new(),
        }
    }

    /// Append a field. Fields added after the first encode or decode are
    /// ignored by this schema's cached layout.
    pub fn field(mut self, name: impl Into<SmolStr>, tag: impl Into<SmolStr>, kind: FieldKind) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            tag: tag.into(),
            kind,
        });
        self
    }

    pub fn layout(&self) -> &RecordLayout<Object> {
        self.layout.get_or_init(|| {
            let decls = self
                .fields
                .iter()
                .map(|field| {
                    FieldDecl::with_access(
                        field.name.clone(),
                        field.tag.clone(),
                        field.kind.value_kind(),
                        field.kind.type_name(),
                        Box::new(ObjectField {
                            key: field.name.clone(),
                            kind: field.kind,
                        }),
                    )
                })
                .collect();
            Arc::new(RecordLayout::from_decls(self.name.clone(), decls))
        })
    }

    /// Decode one line into a [`Value::Object`] holding every placed field.
    pub fn decode_line(&self, line: &[u8], config: &FormatConfig) -> Result<Value> {
        Ok(Value::Object(self.layout().decode_line(line, config)?))
    }

    /// Decode every line of `input` into a [`Value::Array`] of objects.
    pub fn decode_all(&self, input: &[u8], config: &FormatConfig) -> Result<Value> {
        let layout = self.layout();
        let mut lines = LineReader::new(input, config);
        let mut records = Vec::new();
        while let Some(line) = lines.next_line()? {
            records.push(Value::Object(layout.decode_line(line, config)?));
        }
        Ok(Value::Array(records))
    }

    /// Encode an object as one line, or an array of objects as lines joined
    /// by the terminator. Anything else is an invalid target.
    pub fn encode(&self, value: &Value, config: &FormatConfig) -> Result<Vec<u8>> {
        let layout = self.layout();
        match value {
            Value::Object(record) => layout.encode(record, config),
            Value::Array(items) => {
                let mut out = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let Value::Object(record) = item else {
                        return Err(invalid_target(item));
                    };
                    if i > 0 {
                        out.extend_from_slice(config.terminator_bytes());
                    }
                    out.extend_from_slice(&layout.encode(record, config)?);
                }
                Ok(out)
            }
            other => Err(invalid_target(other)),
        }
    }

    /// [`Schema::decode_all`] rendered as a JSON array of objects.
    pub fn decode_json(&self, input: &[u8], config: &FormatConfig) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.decode_all(input, config)?)?)
    }

    /// [`Schema::encode`] for JSON input: an object becomes one line, an
    /// array of objects becomes lines joined by the terminator.
    pub fn encode_json(&self, json: &serde_json::Value, config: &FormatConfig) -> Result<Vec<u8>> {
        let value = Value::deserialize(json)?;
        self.encode(&value, config)
    }
}

fn invalid_target(value: &Value) -> FixedWidthError {
    FixedWidthError::InvalidTarget {
        type_desc: SmolStr::new(value.type_desc()),
    }
}

// ─── ObjectField ────────────────────────────────────────────────────────────

/// Reads and writes one key of a dynamic record.
struct ObjectField {
    key: SmolStr,
    kind: FieldKind,
}

impl FieldAccess<Object> for ObjectField {
    fn encode<'r>(
        &self,
        record: &'r Object,
        ctx: &EncodeContext<'_>,
    ) -> std::result::Result<Cow<'r, [u8]>, ConvertError> {
        match record.get(&self.key) {
            Some(value) => value.encode_fixed(ctx),
            None => Ok(Cow::Borrowed(&[])),
        }
    }

    fn decode(&self, record: &mut Object, raw: &RawValue<'_>) -> std::result::Result<(), ConvertError> {
        record.insert(self.key.clone(), self.kind.decode(raw)?);
        Ok(())
    }
}
