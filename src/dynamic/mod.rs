//! Records whose shape is only known at run time.
//!
//! A [`Schema`] lists `(name, tag, kind)` triples and decodes lines into
//! [`Value::Object`]s keyed by field name, or straight into JSON with
//! [`Schema::decode_json`]. [`Value`] also works as a column type inside
//! typed records.

mod schema;
mod value;

pub use schema::{FieldKind, Schema, SchemaField};
pub use value::{Number, Object, Value};
