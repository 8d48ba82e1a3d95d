use std::io::{BufWriter, Write};

use tracing::trace;

use super::LastLayout;
use crate::config::FormatConfig;
use crate::error::{FixedWidthError, Result};
use crate::layout::Record;

// ─── Encoder ────────────────────────────────────────────────────────────────

/// Writes records to a byte stream, one per line.
///
/// Lines are separated by the configured terminator, including across
/// separate `encode` calls; nothing follows the last line. The writer is
/// flushed after every record.
pub struct Encoder<W: Write> {
    writer: BufWriter<W>,
    config: FormatConfig,
    last: LastLayout,
    lines: u64,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, FormatConfig::default())
    }

    pub fn with_config(writer: W, config: FormatConfig) -> Self {
        Encoder {
            writer: BufWriter::new(writer),
            config,
            last: LastLayout::default(),
            lines: 0,
        }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Lines written so far.
    pub fn line_number(&self) -> u64 {
        self.lines
    }

    /// Encode one record. Nothing is written if it fails to encode.
    pub fn encode<T: Record>(&mut self, record: &T) -> Result<()> {
        self.write_record(record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn encode_all<'a, T: Record>(&mut self, records: impl IntoIterator<Item = &'a T>) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_record<T: Record>(&mut self, record: &T) -> Result<()> {
        let layout = self.last.get::<T>();
        let line = layout.encode(record, &self.config)?;
        if self.lines > 0 {
            self.writer.write_all(self.config.terminator_bytes())?;
        }
        self.writer.write_all(&line)?;
        self.lines += 1;
        trace!(line = self.lines, bytes = line.len(), "wrote line");
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| FixedWidthError::Io(err.into_error()))
    }
}
