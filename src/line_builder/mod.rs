use crate::codepoint::RawValue;

// ─── LineBuilder ────────────────────────────────────────────────────────────

/// Mutable, fixed-length line that values are spliced into.
///
/// While only ASCII has been written the line is addressed by byte and
/// writes are plain copies. The first multibyte value materialises a
/// codepoint -> byte table which every later write keeps in sync, growing
/// or shrinking the byte storage when a value's encoded length differs from
/// the span it replaces.
///
/// | Operation                          | Cost                          |
/// |------------------------------------|-------------------------------|
/// | `write_value`, all ASCII           | O(value)                      |
/// | `write_value`, same byte length    | O(value)                      |
/// | `write_value`, different length    | O(value + tail of the line)   |
#[derive(Debug, Clone)]
pub struct LineBuilder {
    data: Vec<u8>,
    /// `codepoints[n]` is the first byte of the n-th codepoint. `None` until
    /// a multibyte character is written.
    codepoints: Option<Vec<usize>>,
}

impl LineBuilder {
    // ════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════

    /// A line of `len` codepoints, all `fill`.
    pub fn new(len: usize, fill: u8) -> Self {
        Self::with_capacity(len, len, fill)
    }

    /// Like [`LineBuilder::new`] but reserves `capacity` bytes up front, for
    /// lines expected to carry multibyte text.
    pub fn with_capacity(len: usize, capacity: usize, fill: u8) -> Self {
        debug_assert!(fill.is_ascii());
        let mut data = Vec::with_capacity(capacity.max(len));
        if len > 0 {
            // Double the filled prefix instead of pushing byte by byte.
            data.push(fill);
            while data.len() < len {
                let n = data.len().min(len - data.len());
                data.extend_from_within(..n);
            }
        }
        LineBuilder {
            data,
            codepoints: None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    /// Length in codepoints once multibyte content exists, in bytes before.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.codepoints {
            Some(codepoints) => codepoints.len(),
            None => self.data.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn has_multibyte(&self) -> bool {
        self.codepoints.is_some()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn codepoint_offsets(&self) -> Option<&[usize]> {
        self.codepoints.as_deref()
    }

    /// Borrow the current line as a value, offsets included.
    pub fn as_raw_value(&self) -> RawValue<'_> {
        match &self.codepoints {
            Some(_) => match std::str::from_utf8(&self.data) {
                Ok(text) => RawValue::text(text),
                Err(_) => RawValue::bytes(&self.data[..]),
            },
            None => RawValue::bytes(&self.data[..]),
        }
    }

    /// Finish the line.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    // ════════════════════════════════════════════════════════════════════════
    // Writes
    // ════════════════════════════════════════════════════════════════════════

    /// Splice `value` in at codepoint `start` (0-based), replacing the
    /// `value.len()` codepoints already there. The caller guarantees that
    /// `start + value.len() <= self.len()`.
    pub fn write_value(&mut self, start: usize, value: &RawValue<'_>) {
        if value.is_empty() {
            return;
        }
        debug_assert!(start + value.len() <= self.len());

        // ASCII fast path.
        if self.codepoints.is_none() && !value.has_multibyte() {
            self.data[start..start + value.byte_len()].copy_from_slice(value.as_bytes());
            return;
        }

        if self.codepoints.is_none() {
            self.init_codepoints();
        }

        let end = start + value.len() - 1;
        let byte_start = self.byte_start(start);
        let mut byte_end = self.byte_end(end);

        let span_len = byte_end + 1 - byte_start;
        let delta = value.byte_len() as isize - span_len as isize;
        if delta != 0 {
            self.adjust_byte_span(end, delta);
            byte_end = self.byte_end(end);
        }

        self.data[byte_start..=byte_end].copy_from_slice(value.as_bytes());

        if delta != 0 || value.has_multibyte() {
            self.correct_codepoints(start, byte_start, value);
        }
    }

    /// Write ASCII text at codepoint `start`.
    pub fn write_ascii(&mut self, start: usize, text: &str) {
        debug_assert!(text.is_ascii());
        self.write_value(start, &RawValue::bytes(text.as_bytes()));
    }

    /// Overwrite `count` codepoints from `start` with the ASCII byte `pad`.
    pub fn fill(&mut self, start: usize, count: usize, pad: u8) {
        if count == 0 {
            return;
        }
        if self.codepoints.is_none() {
            self.data[start..start + count].fill(pad);
            return;
        }
        self.write_value(start, &RawValue::repeat(pad, count));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal: codepoint table
    // ════════════════════════════════════════════════════════════════════════

    /// Identity table for a line that so far holds only ASCII.
    fn init_codepoints(&mut self) {
        self.codepoints = Some((0..self.data.len()).collect());
    }

    #[inline]
    fn byte_start(&self, index: usize) -> usize {
        match &self.codepoints {
            Some(codepoints) => codepoints[index],
            None => index,
        }
    }

    /// Last byte (inclusive) of codepoint `index`.
    #[inline]
    fn byte_end(&self, index: usize) -> usize {
        match &self.codepoints {
            Some(codepoints) if index + 1 == codepoints.len() => self.data.len() - 1,
            Some(codepoints) => codepoints[index + 1] - 1,
            None => index,
        }
    }

    /// Grow or shrink the span ending at codepoint `end` by `delta` bytes,
    /// moving the tail of the line and shifting every later offset.
    fn adjust_byte_span(&mut self, end: usize, delta: isize) {
        let tail_start = self.byte_end(end) + 1;
        let old_len = self.data.len();

        if delta > 0 {
            let growth = delta as usize;
            self.data.resize(old_len + growth, b' ');
            // Shift tail right
            self.data.copy_within(tail_start..old_len, tail_start + growth);
        } else {
            let shrink = delta.unsigned_abs();
            // Shift tail left
            self.data.copy_within(tail_start..old_len, tail_start - shrink);
            self.data.truncate(old_len - shrink);
        }

        if let Some(codepoints) = self.codepoints.as_mut() {
            for offset in &mut codepoints[end + 1..] {
                *offset = (*offset as isize + delta) as usize;
            }
        }
    }

    /// Recompute the offsets inside the span just written.
    fn correct_codepoints(&mut self, start: usize, byte_start: usize, value: &RawValue<'_>) {
        let Some(codepoints) = self.codepoints.as_mut() else {
            return;
        };
        let span = &mut codepoints[start..start + value.len()];
        match value.codepoint_offsets() {
            Some(offsets) => {
                for (slot, offset) in span.iter_mut().zip(offsets) {
                    *slot = byte_start + offset;
                }
            }
            None => {
                for (i, slot) in span.iter_mut().enumerate() {
                    *slot = byte_start + i;
                }
            }
        }
    }
}
