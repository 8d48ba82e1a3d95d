use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::error::{FixedWidthError, Result};

// ─── Field Declaration Grammar ──────────────────────────────────────────────
//
//   start "," end [ "," alignment [ "," pad ] ]
//
//   start, end   1-based inclusive positions, start <= end
//   alignment    default | left | right | none   (unknown tokens are ignored)
//   pad          one byte, "_" for space, "__" for underscore
//
// No whitespace anywhere, at most four parts.

pub const DEFAULT_PAD: u8 = b' ';

const MAX_TAG_PARTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Right,
    None,
}

impl Alignment {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "default" => Some(Alignment::Default),
            "left" => Some(Alignment::Left),
            "right" => Some(Alignment::Right),
            "none" => Some(Alignment::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Default => "default",
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::None => "none",
        }
    }
}

/// How a value sits inside its interval. The pad is a single ASCII byte;
/// deserializing any other pad fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFieldFormat")]
pub struct FieldFormat {
    pub alignment: Alignment,
    pub pad: u8,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawFieldFormat {
    alignment: Alignment,
    pad: u8,
}

impl Default for RawFieldFormat {
    fn default() -> Self {
        RawFieldFormat {
            alignment: Alignment::Default,
            pad: DEFAULT_PAD,
        }
    }
}

impl TryFrom<RawFieldFormat> for FieldFormat {
    type Error = FixedWidthError;

    fn try_from(raw: RawFieldFormat) -> Result<Self> {
        FieldFormat::try_new(raw.alignment, raw.pad)
    }
}

impl Default for FieldFormat {
    fn default() -> Self {
        FieldFormat {
            alignment: Alignment::Default,
            pad: DEFAULT_PAD,
        }
    }
}

impl FieldFormat {
    pub const fn new(alignment: Alignment, pad: u8) -> Self {
        FieldFormat { alignment, pad }
    }

    /// Like [`FieldFormat::new`], rejecting pads outside ASCII.
    pub fn try_new(alignment: Alignment, pad: u8) -> Result<Self> {
        if !pad.is_ascii() {
            return Err(FixedWidthError::InvalidPad { pad });
        }
        Ok(FieldFormat { alignment, pad })
    }

    /// Right-aligned and zero-padded, the usual numeric override.
    pub const fn right_zero_padded() -> Self {
        FieldFormat {
            alignment: Alignment::Right,
            pad: b'0',
        }
    }

    /// Only `right` pads on the left. `default` and `none` behave like `left`
    /// when encoding, whatever the pad character is.
    #[inline]
    pub fn pads_left(&self) -> bool {
        self.alignment == Alignment::Right
    }
}

/// A successfully parsed field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// 1-based, inclusive.
    pub start: usize,
    /// 1-based, inclusive.
    pub end: usize,
    pub format: FieldFormat,
    /// The declaration carried a recognised alignment or a pad character.
    pub explicit_format: bool,
}

impl Tag {
    #[inline]
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Parse a field declaration. `None` means the field is not placed at all.
pub fn parse_tag(tag: &str) -> Option<Tag> {
    if tag.contains(' ') {
        return None;
    }

    let mut parts: ArrayVec<&str, MAX_TAG_PARTS> = ArrayVec::new();
    for part in tag.split(',') {
        parts.try_push(part).ok()?;
    }
    if parts.len() < 2 {
        return None;
    }

    let start: usize = parts[0].parse().ok()?;
    let end: usize = parts[1].parse().ok()?;
    if start == 0 || start > end {
        return None;
    }

    let mut format = FieldFormat::default();
    let mut explicit_format = false;

    if let Some(token) = parts.get(2) {
        if let Some(alignment) = Alignment::parse(token) {
            format.alignment = alignment;
            explicit_format = true;
        }
    }

    if let Some(token) = parts.get(3) {
        format.pad = parse_pad(token)?;
        explicit_format = true;
    }

    Some(Tag {
        start,
        end,
        format,
        explicit_format,
    })
}

fn parse_pad(token: &str) -> Option<u8> {
    match token.as_bytes() {
        b"_" => Some(b' '),
        b"__" => Some(b'_'),
        [byte] => Some(*byte),
        _ => None,
    }
}
