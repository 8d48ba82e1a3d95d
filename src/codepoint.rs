use std::borrow::Cow;

use crate::error::{ConvertError, FixedWidthError, Result};
use crate::tag::Alignment;

// ─── Codepoint Index ────────────────────────────────────────────────────────

/// Offset of the first byte with the high bit set, or `data.len()` for
/// pure ASCII input.
#[inline]
pub fn first_multibyte(data: &[u8]) -> usize {
    data.iter().position(|b| !b.is_ascii()).unwrap_or(data.len())
}

/// Build the codepoint -> byte offset table for `data`.
///
/// Returns `None` for pure ASCII, where every codepoint offset equals its
/// byte offset. `offsets[n]` is the first byte of the n-th codepoint.
pub fn index_codepoints(data: &[u8]) -> Result<Option<Vec<usize>>> {
    let first = first_multibyte(data);
    if first == data.len() {
        return Ok(None);
    }

    let tail = std::str::from_utf8(&data[first..]).map_err(|e| {
        FixedWidthError::InvalidCodepoint {
            offset: first + e.valid_up_to(),
        }
    })?;

    let mut offsets = Vec::with_capacity(first + tail.len());
    offsets.extend(0..first);
    offsets.extend(tail.char_indices().map(|(i, _)| first + i));
    Ok(Some(offsets))
}

// ─── RawValue ───────────────────────────────────────────────────────────────

/// A slice of a line, addressed by byte when `offsets` is absent and by
/// codepoint when it is present.
///
/// Invariant: when present, `offsets.len()` is the number of codepoints in
/// `bytes`, offsets are strictly increasing, and at least one codepoint is
/// wider than a byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawValue<'a> {
    bytes: Cow<'a, [u8]>,
    offsets: Option<Vec<usize>>,
}

impl<'a> RawValue<'a> {
    /// Wrap `bytes`, indexing codepoints when `use_codepoints` is set.
    pub fn new(bytes: impl Into<Cow<'a, [u8]>>, use_codepoints: bool) -> Result<Self> {
        let bytes = bytes.into();
        let offsets = if use_codepoints {
            index_codepoints(&bytes)?
        } else {
            None
        };
        Ok(RawValue { bytes, offsets })
    }

    /// Byte-addressed value. Never fails.
    pub fn bytes(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        RawValue {
            bytes: bytes.into(),
            offsets: None,
        }
    }

    /// Codepoint-addressed value over valid UTF-8. Never fails.
    pub fn text(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let offsets = if first_multibyte(bytes) == bytes.len() {
            None
        } else {
            Some(text.char_indices().map(|(i, _)| i).collect())
        };
        RawValue {
            bytes: Cow::Borrowed(bytes),
            offsets,
        }
    }

    /// `count` copies of an ASCII byte.
    pub fn repeat(byte: u8, count: usize) -> RawValue<'static> {
        debug_assert!(byte.is_ascii());
        RawValue {
            bytes: Cow::Owned(vec![byte; count]),
            offsets: None,
        }
    }

    /// Length in addressing units: codepoints when indexed, bytes otherwise.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.len(),
            None => self.bytes.len(),
        }
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn has_multibyte(&self) -> bool {
        self.offsets.is_some()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> Result<&str, ConvertError> {
        Ok(std::str::from_utf8(&self.bytes)?)
    }

    pub fn codepoint_offsets(&self) -> Option<&[usize]> {
        self.offsets.as_deref()
    }

    /// First byte of unit `index`.
    #[inline]
    pub(crate) fn byte_start(&self, index: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets[index],
            None => index,
        }
    }

    /// Last byte (inclusive) of unit `index`.
    #[inline]
    pub(crate) fn byte_end(&self, index: usize) -> usize {
        match &self.offsets {
            Some(offsets) if index + 1 == offsets.len() => self.bytes.len() - 1,
            Some(offsets) => offsets[index + 1] - 1,
            None => index,
        }
    }

    /// Units `start..=end` (0-based). Both must be in range.
    pub fn slice(&self, start: usize, end: usize) -> RawValue<'_> {
        let byte_start = self.byte_start(start);
        let byte_end = self.byte_end(end);
        let bytes = &self.bytes[byte_start..=byte_end];
        let offsets = self.offsets.as_ref().and_then(|offsets| {
            // a slice made only of single-byte codepoints needs no table
            if bytes.len() == end - start + 1 {
                None
            } else {
                Some(offsets[start..=end].iter().map(|o| o - byte_start).collect())
            }
        });
        RawValue {
            bytes: Cow::Borrowed(bytes),
            offsets,
        }
    }

    /// The 1-based inclusive interval `start_pos..=end_pos`, clipped to the
    /// value. Columns past the end of a short line come back empty.
    pub fn interval(&self, start_pos: usize, end_pos: usize) -> RawValue<'_> {
        let len = self.len();
        if len == 0 || start_pos == 0 || start_pos > len {
            return RawValue::default();
        }
        self.slice(start_pos - 1, end_pos.min(len) - 1)
    }

    /// Strip pad bytes the way `alignment` dictates: `left` trims the right
    /// side, `right` trims the left side, `default`/`none` trim both.
    pub fn trim(&self, alignment: Alignment, pad: u8) -> RawValue<'_> {
        let bytes = self.as_bytes();
        let (trim_leading, trim_trailing) = match alignment {
            Alignment::Left => (false, true),
            Alignment::Right => (true, false),
            Alignment::Default | Alignment::None => (true, true),
        };

        let lead = if trim_leading {
            bytes.iter().take_while(|&&b| b == pad).count()
        } else {
            0
        };
        let trail = if trim_trailing {
            bytes[lead..].iter().rev().take_while(|&&b| b == pad).count()
        } else {
            0
        };

        if lead + trail == bytes.len() {
            return RawValue::default();
        }
        // pad is a single ASCII byte, so trimmed bytes are trimmed units
        self.slice(lead, self.len() - trail - 1)
    }

    pub fn into_owned(self) -> RawValue<'static> {
        RawValue {
            bytes: Cow::Owned(self.bytes.into_owned()),
            offsets: self.offsets,
        }
    }

    pub fn into_bytes(self) -> Cow<'a, [u8]> {
        self.bytes
    }
}
