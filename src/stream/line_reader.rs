use std::io::{BufRead, Read};

use tracing::{trace, warn};

use crate::config::FormatConfig;
use crate::error::{FixedWidthError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Exhausted,
    Broken,
}

/// Splits a buffered stream into lines on a terminator of one or more bytes.
///
/// A trailing terminator does not produce an empty last line; blank lines
/// in the middle do. Lines longer than `max_line_len` bytes break the
/// stream: that call and every later one report
/// [`FixedWidthError::LineTooLong`].
pub struct LineReader<R> {
    inner: R,
    terminator: Vec<u8>,
    max_line_len: usize,
    buf: Vec<u8>,
    line_no: u64,
    state: State,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, config: &FormatConfig) -> Self {
        LineReader {
            inner,
            terminator: config.terminator_bytes().to_vec(),
            max_line_len: config.max_line_len,
            buf: Vec::new(),
            line_no: 0,
            state: State::Open,
        }
    }

    /// Lines returned so far.
    pub fn line_number(&self) -> u64 {
        self.line_no
    }

    /// The next line without its terminator, `None` once input is exhausted.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        match self.state {
            State::Open => {}
            State::Exhausted => return Ok(None),
            State::Broken => return Err(self.too_long()),
        }

        self.buf.clear();
        // terminator_bytes never hands out an empty terminator
        let delim = self.terminator.last().copied().unwrap_or(b'\n');
        let limit = self.max_line_len.saturating_add(self.terminator.len());

        loop {
            // invariant: buf.len() <= limit, so the budget is at least one byte
            let budget = u64::try_from(limit - self.buf.len())
                .unwrap_or(u64::MAX)
                .saturating_add(1);
            let read = (&mut self.inner).take(budget).read_until(delim, &mut self.buf)?;

            if self.buf.ends_with(&self.terminator) {
                let len = self.buf.len() - self.terminator.len();
                self.buf.truncate(len);
                break;
            }
            if read == 0 {
                self.state = State::Exhausted;
                if self.buf.is_empty() {
                    return Ok(None);
                }
                break;
            }
            if self.buf.len() > limit {
                return Err(self.break_stream());
            }
        }

        if self.buf.len() > self.max_line_len {
            return Err(self.break_stream());
        }

        self.line_no += 1;
        trace!(line = self.line_no, bytes = self.buf.len(), "read line");
        Ok(Some(&self.buf))
    }

    fn break_stream(&mut self) -> FixedWidthError {
        self.state = State::Broken;
        warn!(line = self.line_no + 1, max = self.max_line_len, "line too long, stream is broken");
        self.too_long()
    }

    fn too_long(&self) -> FixedWidthError {
        FixedWidthError::LineTooLong {
            max: self.max_line_len,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
