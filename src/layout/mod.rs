use std::any::type_name;
use std::borrow::Cow;

use smol_str::SmolStr;
use tracing::debug;

use crate::codepoint::RawValue;
use crate::config::FormatConfig;
use crate::error::{ConvertError, FixedWidthError, Result};
use crate::line_builder::LineBuilder;
use crate::tag::{parse_tag, FieldFormat, DEFAULT_PAD};
use crate::value::{EncodeContext, FixedValue, ValueKind};

mod cache;

pub use cache::LayoutCache;

// ─── Record ─────────────────────────────────────────────────────────────────

/// A struct whose fields map onto columns of a line.
///
/// Usually implemented through [`record!`](crate::record). Fields are listed
/// in declaration order; that order decides which field wins when two
/// intervals overlap.
pub trait Record: Default + 'static {
    const NAME: &'static str;

    fn fields() -> Vec<FieldDecl<Self>>;
}

// ─── Field access ───────────────────────────────────────────────────────────

/// Type-erased converter for one field of `R`, resolved once per layout.
pub(crate) trait FieldAccess<R>: Send + Sync {
    fn encode<'r>(
        &self,
        record: &'r R,
        ctx: &EncodeContext<'_>,
    ) -> std::result::Result<Cow<'r, [u8]>, ConvertError>;

    fn decode(&self, record: &mut R, raw: &RawValue<'_>) -> std::result::Result<(), ConvertError>;
}

struct Accessor<R, T> {
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T: FixedValue + 'static> FieldAccess<R> for Accessor<R, T> {
    fn encode<'r>(
        &self,
        record: &'r R,
        ctx: &EncodeContext<'_>,
    ) -> std::result::Result<Cow<'r, [u8]>, ConvertError> {
        (self.get)(record).encode_fixed(ctx)
    }

    fn decode(&self, record: &mut R, raw: &RawValue<'_>) -> std::result::Result<(), ConvertError> {
        (self.get_mut)(record).decode_fixed(raw)
    }
}

/// Declaration of one field: its name, its tag and how to reach it.
pub struct FieldDecl<R> {
    name: SmolStr,
    tag: SmolStr,
    kind: ValueKind,
    trim: bool,
    type_name: &'static str,
    access: Box<dyn FieldAccess<R>>,
}

impl<R: 'static> FieldDecl<R> {
    /// `tag` follows `start,end[,alignment[,pad]]`. An empty or malformed
    /// tag leaves the field out of the layout.
    pub fn new<T: FixedValue + 'static>(
        name: &'static str,
        tag: &'static str,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> Self {
        FieldDecl {
            name: SmolStr::new_static(name),
            tag: SmolStr::new_static(tag),
            kind: T::KIND,
            trim: T::TRIM,
            type_name: type_name::<T>(),
            access: Box::new(Accessor { get, get_mut }),
        }
    }

    /// Declaration with a hand-built accessor, for layouts assembled at run time.
    pub(crate) fn with_access(
        name: SmolStr,
        tag: SmolStr,
        kind: ValueKind,
        type_name: &'static str,
        access: Box<dyn FieldAccess<R>>,
    ) -> Self {
        FieldDecl {
            name,
            tag,
            kind,
            trim: true,
            type_name,
            access,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

// ─── FieldSpec ──────────────────────────────────────────────────────────────

/// A placed field: validated interval, format and converter.
pub struct FieldSpec<R> {
    name: SmolStr,
    type_name: &'static str,
    start: usize,
    end: usize,
    format: FieldFormat,
    explicit_format: bool,
    numeric: bool,
    trim: bool,
    access: Box<dyn FieldAccess<R>>,
}

impl<R> FieldSpec<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based, inclusive.
    pub fn start(&self) -> usize {
        self.start
    }

    /// 1-based, inclusive.
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn format(&self) -> FieldFormat {
        self.format
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// The tag's format, unless the tag set none and the config carries a
    /// numeric override this field qualifies for.
    #[inline]
    pub fn effective_format(&self, config: &FormatConfig) -> FieldFormat {
        match config.numeric_format {
            Some(numeric) if self.numeric && !self.explicit_format => numeric,
            _ => self.format,
        }
    }
}

impl<R> std::fmt::Debug for FieldSpec<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("format", &self.format)
            .field("explicit_format", &self.explicit_format)
            .field("numeric", &self.numeric)
            .finish()
    }
}

// ─── RecordLayout ───────────────────────────────────────────────────────────

/// The ordered field specs of one record shape plus its line length.
///
/// Immutable once built; shared through [`LayoutCache`].
///
/// | Operation         | Cost                                                   |
/// |-------------------|--------------------------------------------------------|
/// | `encode`, ASCII   | one line allocation + O(width) per field               |
/// | `encode`, UTF-8   | as above + O(tail) per field whose byte length changes |
/// | `decode_line`     | O(line) codepoint index (codepoint mode) + O(field)    |
pub struct RecordLayout<R> {
    name: SmolStr,
    line_len: usize,
    fields: Vec<FieldSpec<R>>,
}

impl<R: Record> RecordLayout<R> {
    /// Build the layout of `R` from its declared fields.
    pub fn build() -> Self {
        Self::from_decls(R::NAME, R::fields())
    }
}

impl<R> RecordLayout<R> {
    /// Parse every declaration's tag; fields with an invalid tag are left out.
    pub fn from_decls(name: impl Into<SmolStr>, decls: Vec<FieldDecl<R>>) -> Self {
        let name = name.into();
        let mut fields = Vec::with_capacity(decls.len());
        let mut line_len = 0;

        for decl in decls {
            let Some(tag) = parse_tag(&decl.tag) else {
                if !decl.tag.is_empty() {
                    debug!(record = %name, field = %decl.name, tag = %decl.tag, "skipping field with invalid tag");
                }
                continue;
            };
            line_len = line_len.max(tag.end);
            fields.push(FieldSpec {
                name: decl.name,
                type_name: decl.type_name,
                start: tag.start,
                end: tag.end,
                format: tag.format,
                explicit_format: tag.explicit_format,
                numeric: decl.kind.is_numeric(),
                trim: decl.trim,
                access: decl.access,
            });
        }

        debug!(record = %name, fields = fields.len(), line_len, "built record layout");
        RecordLayout {
            name,
            line_len,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Largest end position over all placed fields, 0 when none are.
    pub fn line_len(&self) -> usize {
        self.line_len
    }

    pub fn fields(&self) -> &[FieldSpec<R>] {
        &self.fields
    }

    // ════════════════════════════════════════════════════════════════════════
    // Encode
    // ════════════════════════════════════════════════════════════════════════

    /// Render `record` as one line, without terminator.
    pub fn encode(&self, record: &R, config: &FormatConfig) -> Result<Vec<u8>> {
        Ok(self.encode_line(record, config)?.into_bytes())
    }

    /// Render `record` into a fresh pad-filled [`LineBuilder`].
    ///
    /// Fields are written in declaration order, so a later field overwrites
    /// the columns it shares with an earlier one.
    pub fn encode_line(&self, record: &R, config: &FormatConfig) -> Result<LineBuilder> {
        let mut line = LineBuilder::new(self.line_len, DEFAULT_PAD);

        for spec in &self.fields {
            let width = spec.width();
            let ctx = EncodeContext::new(config, width);
            let bytes = spec
                .access
                .encode(record, &ctx)
                .map_err(|source| self.encode_error(spec, source))?;

            let value = RawValue::new(bytes, config.use_codepoint_indices)?;
            let value = if value.len() > width {
                if config.error_on_overflow {
                    return Err(FixedWidthError::Overflow {
                        field: spec.name.clone(),
                        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                        len: value.len(),
                        width,
                    });
                }
                value.slice(0, width - 1).into_owned()
            } else {
                value
            };

            let format = spec.effective_format(config);
            let start = spec.start - 1;
            let pad_len = width - value.len();
            if format.pads_left() {
                line.fill(start, pad_len, format.pad);
                line.write_value(start + pad_len, &value);
            } else {
                line.write_value(start, &value);
                line.fill(start + value.len(), pad_len, format.pad);
            }
        }

        Ok(line)
    }

    fn encode_error(&self, spec: &FieldSpec<R>, source: ConvertError) -> FixedWidthError {
        match source {
            ConvertError::Nested(inner) => *inner,
            ConvertError::Unsupported { type_name } => FixedWidthError::UnsupportedType {
                type_name,
                record: self.name.clone(),
                field: spec.name.clone(),
            },
            source => FixedWidthError::Encode {
                type_name: spec.type_name,
                record: self.name.clone(),
                field: spec.name.clone(),
                source,
            },
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Decode
    // ════════════════════════════════════════════════════════════════════════

    /// Decode one line, without terminator, into a fresh record.
    pub fn decode_line(&self, line: &[u8], config: &FormatConfig) -> Result<R>
    where
        R: Default,
    {
        let raw = RawValue::new(line, config.use_codepoint_indices)?;
        let mut record = R::default();
        self.decode_into(&raw, &mut record)?;
        Ok(record)
    }

    /// Decode every placed field of `record` from `raw`. Columns past the end
    /// of a short line decode as empty. Trimming follows the tag alone; the
    /// numeric override is an encoding concern.
    pub fn decode_into(&self, raw: &RawValue<'_>, record: &mut R) -> Result<()> {
        for spec in &self.fields {
            let interval = raw.interval(spec.start, spec.end);
            let trimmed;
            let value = if spec.trim {
                trimmed = interval.trim(spec.format.alignment, spec.format.pad);
                &trimmed
            } else {
                &interval
            };

            spec.access
                .decode(record, value)
                .map_err(|source| self.decode_error(spec, value, source))?;
        }
        Ok(())
    }

    fn decode_error(&self, spec: &FieldSpec<R>, value: &RawValue<'_>, source: ConvertError) -> FixedWidthError {
        match source {
            ConvertError::Nested(inner) => *inner,
            source => FixedWidthError::Decode {
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                type_name: spec.type_name,
                record: self.name.clone(),
                field: spec.name.clone(),
                source,
            },
        }
    }
}

impl<R> std::fmt::Debug for RecordLayout<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLayout")
            .field("name", &self.name)
            .field("line_len", &self.line_len)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests;
