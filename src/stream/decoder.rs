use std::io::{BufReader, Read};
use std::marker::PhantomData;

use super::{LastLayout, LineReader};
use crate::config::FormatConfig;
use crate::error::{FixedWidthError, Result};
use crate::layout::Record;

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Reads records from a byte stream, one per line.
///
/// A line that fails to convert is reported and skipped; the next call
/// reads the following line. An over-long line or an I/O error ends the
/// stream.
pub struct Decoder<R: Read> {
    lines: LineReader<BufReader<R>>,
    config: FormatConfig,
    last: LastLayout,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, FormatConfig::default())
    }

    pub fn with_config(reader: R, config: FormatConfig) -> Self {
        Decoder {
            lines: LineReader::new(BufReader::new(reader), &config),
            config,
            last: LastLayout::default(),
        }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Lines consumed so far.
    pub fn line_number(&self) -> u64 {
        self.lines.line_number()
    }

    /// The next record, or `None` at end of input. Keeps returning `None`
    /// once input is exhausted.
    pub fn decode<T: Record>(&mut self) -> Result<Option<T>> {
        let layout = self.last.get::<T>();
        let Some(line) = self.lines.next_line()? else {
            return Ok(None);
        };
        layout.decode_line(line, &self.config).map(Some)
    }

    /// Every remaining record, stopping at the first error.
    pub fn decode_all<T: Record>(&mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while let Some(record) = self.decode()? {
            records.push(record);
        }
        Ok(records)
    }

    pub fn records<T: Record>(&mut self) -> Records<'_, R, T> {
        Records {
            decoder: self,
            done: false,
            _marker: PhantomData,
        }
    }
}

// ─── Records ────────────────────────────────────────────────────────────────

/// Iterator over the remaining records of a [`Decoder`].
///
/// Conversion errors are yielded and iteration continues with the next
/// line; stream errors are yielded once and end iteration.
pub struct Records<'a, R: Read, T> {
    decoder: &'a mut Decoder<R>,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<R: Read, T: Record> Iterator for Records<'_, R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.decode::<T>() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                if matches!(err, FixedWidthError::LineTooLong { .. } | FixedWidthError::Io(_)) {
                    self.done = true;
                }
                Some(Err(err))
            }
        }
    }
}
