//! Transcoder module
//!
//! Converts custom-delimited flat text into quoted CSV in a single streaming
//! pass.
//!
//! # Algorithm
//!
//! For every physical line read from the input:
//!
//! 1. A blank line read while no record is pending is copied to the output as
//!    a bare `\n`.
//! 2. Otherwise the line is appended to the accumulator.
//! 3. If the line itself ends with the line terminator, the accumulator minus
//!    the terminator is split on the field separator and written as one CSV
//!    line, then the accumulator is cleared.
//! 4. If not, a `\n` is appended to the accumulator so a field spanning
//!    several physical lines keeps its line breaks.
//!
//! The terminator is only ever checked against the tail of the line just
//! read, never against the whole accumulator. Memory use is bounded by the
//! largest logical record, not by the input size.

mod lines;
mod split;
mod stats;

use std::fmt;
use std::io::{BufRead, Write};

use csv::{QuoteStyle, Terminator, WriterBuilder};

pub use lines::PhysicalLines;
pub use split::FieldSplitter;
pub use stats::TranscodeStats;

use crate::config::{TrailingRecord, TranscodeConfig};
use crate::error::CleanerError;

/// Reusable transcoder.
///
/// Owns a validated [`TranscodeConfig`] and the buffers used while
/// reassembling records. The buffers are cleared between records and between
/// calls, so one `Transcoder` can process many streams without reallocating.
/// Independent calls share no state; use one `Transcoder` per thread.
///
/// # Example
///
/// ```
/// use csv_cleaner::config::TranscodeConfig;
/// use csv_cleaner::transcoder::Transcoder;
///
/// let mut transcoder = Transcoder::new(TranscodeConfig::default());
/// let mut input = &b"field1~^~A\nmultiline\nfield~^~field3-|\n"[..];
/// let mut output = Vec::new();
///
/// let stats = transcoder.transcode(&mut input, &mut output).unwrap();
/// assert_eq!(stats.records, 1);
/// assert_eq!(output, b"\"field1\",\"A\nmultiline\nfield\",\"field3\"\n");
/// ```
pub struct Transcoder {
    config: TranscodeConfig,
    /// Logical record being reassembled.
    record: Vec<u8>,
    /// Last physical line read.
    line: Vec<u8>,
    /// Quotes every field and doubles embedded `"`; holds one encoded CSV
    /// line at a time.
    encoder: csv::Writer<Vec<u8>>,
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transcoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self {
            config,
            record: Vec::new(),
            line: Vec::new(),
            encoder: csv_encoder(),
        }
    }

    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    /// Transcode `input` into `output` until the input is exhausted.
    ///
    /// Output is written one record at a time and flushed once at the end.
    /// Neither stream is closed.
    ///
    /// # Errors
    ///
    /// - [`CleanerError::Io`] on any read or write failure; the call stops at
    ///   the first one and whatever was already written stays written
    /// - [`CleanerError::UnterminatedRecord`] if the input ends mid-record and
    ///   the trailing record policy is [`TrailingRecord::Reject`]
    pub fn transcode<R, W>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<TranscodeStats, CleanerError>
    where
        R: BufRead + ?Sized,
        W: Write + ?Sized,
    {
        let separator = self.config.field_separator().as_bytes();
        let terminator = self.config.line_terminator().as_bytes();
        let mut stats = TranscodeStats::default();
        let mut lines = PhysicalLines::new(input);

        self.record.clear();
        self.encoder = csv_encoder();

        while lines.read_line(&mut self.line)? {
            stats.physical_lines += 1;

            if self.record.is_empty() && self.line.is_empty() {
                output.write_all(b"\n")?;
                stats.blank_lines += 1;
                continue;
            }

            self.record.extend_from_slice(&self.line);

            if self.line.ends_with(terminator) {
                let body_len = self.record.len() - terminator.len();
                write_record(
                    &self.record[..body_len],
                    separator,
                    &mut self.encoder,
                    output,
                    &mut stats,
                )?;
                self.record.clear();
            } else {
                self.record.push(b'\n');
            }
        }

        if !self.record.is_empty() {
            // Drop the line break reinserted after the last line read.
            let pending = self.record.len() - 1;
            match self.config.trailing_record() {
                TrailingRecord::Drop => {
                    stats.dropped_trailing_bytes = pending;
                }
                TrailingRecord::Flush => {
                    write_record(
                        &self.record[..pending],
                        separator,
                        &mut self.encoder,
                        output,
                        &mut stats,
                    )?;
                    stats.flushed_trailing = true;
                }
                TrailingRecord::Reject => {
                    let line = lines.line_number();
                    self.record.clear();
                    return Err(CleanerError::UnterminatedRecord {
                        line,
                        bytes: pending,
                    });
                }
            }
            self.record.clear();
        }

        output.flush()?;
        Ok(stats)
    }
}

/// Every field quoted, `"` doubled, `\n` after each record, any field count.
fn csv_encoder() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new())
}

fn write_record<W: Write + ?Sized>(
    body: &[u8],
    separator: &[u8],
    encoder: &mut csv::Writer<Vec<u8>>,
    output: &mut W,
    stats: &mut TranscodeStats,
) -> Result<(), CleanerError> {
    let mut fields = 0;
    encoder.write_record(FieldSplitter::new(body, separator).inspect(|_| fields += 1))?;
    encoder.flush()?;

    let written = output.write_all(encoder.get_ref());
    *encoder = csv_encoder();
    written?;

    stats.record_emitted(body.len(), fields);
    Ok(())
}

/// Transcode one stream pair with the given configuration.
///
/// Convenience wrapper around [`Transcoder::transcode`] for callers that do
/// not need to reuse buffers across calls.
pub fn transcode<R, W>(
    input: &mut R,
    output: &mut W,
    config: &TranscodeConfig,
) -> Result<TranscodeStats, CleanerError>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    Transcoder::new(config.clone()).transcode(input, output)
}
