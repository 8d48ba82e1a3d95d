use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::tag::FieldFormat;

// ─── Defaults ───────────────────────────────────────────────────────────────

pub const DEFAULT_LINE_TERMINATOR: &str = "\n";
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;
pub const DEFAULT_FLOAT_PRECISION: usize = 2;

// ─── FormatConfig ───────────────────────────────────────────────────────────

/// Options shared by encoding and decoding.
///
/// Loadable from JSON; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Tag positions count codepoints instead of bytes.
    pub use_codepoint_indices: bool,
    /// Separates lines on both sides. May be several bytes, e.g. `"\r\n"`.
    pub line_terminator: SmolStr,
    /// Longest line the decoder accepts, in bytes, terminator excluded.
    pub max_line_len: usize,
    /// Report values wider than their column instead of truncating them.
    pub error_on_overflow: bool,
    /// Format for numeric fields whose tag sets no alignment or pad.
    pub numeric_format: Option<FieldFormat>,
    /// Fractional digits written for `f32` and `f64`.
    pub float_precision: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            use_codepoint_indices: false,
            line_terminator: SmolStr::new_static(DEFAULT_LINE_TERMINATOR),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            error_on_overflow: false,
            numeric_format: None,
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codepoint_indices(mut self, enabled: bool) -> Self {
        self.use_codepoint_indices = enabled;
        self
    }

    /// Empty terminators are ignored.
    pub fn with_line_terminator(mut self, terminator: impl AsRef<str>) -> Self {
        let terminator = terminator.as_ref();
        if !terminator.is_empty() {
            self.line_terminator = SmolStr::new(terminator);
        }
        self
    }

    pub fn with_max_line_len(mut self, max: usize) -> Self {
        self.max_line_len = max;
        self
    }

    pub fn with_overflow_errors(mut self, enabled: bool) -> Self {
        self.error_on_overflow = enabled;
        self
    }

    /// Right-align numeric fields and pad them with `'0'` unless their tag
    /// says otherwise.
    pub fn with_right_aligned_zero_padded_numbers(mut self) -> Self {
        self.numeric_format = Some(FieldFormat::right_zero_padded());
        self
    }

    /// A format whose pad is not ASCII is ignored.
    pub fn with_numeric_format(mut self, format: Option<FieldFormat>) -> Self {
        self.numeric_format = format.filter(|format| format.pad.is_ascii());
        self
    }

    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = precision;
        self
    }

    /// The terminator as bytes. Falls back to `"\n"` if a deserialized
    /// config carried an empty one.
    pub fn terminator_bytes(&self) -> &[u8] {
        if self.line_terminator.is_empty() {
            DEFAULT_LINE_TERMINATOR.as_bytes()
        } else {
            self.line_terminator.as_bytes()
        }
    }
}
