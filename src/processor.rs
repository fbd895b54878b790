//! File processor
//!
//! Hosts the transcoder the way a data-flow processor would: it owns the
//! streams, runs one transcode per input, and routes the result.
//!
//! # Routing
//!
//! - **Success**: the transformed content is written to a temporary file next
//!   to the destination and persisted over the destination path once the
//!   transcode completes, so a failed run never leaves a half-written output.
//! - **Failure**: the temporary file is discarded, the untouched original is
//!   copied into the failure directory (when one is configured) and the error
//!   is logged.
//!
//! # Example
//!
//! ```no_run
//! use csv_cleaner::config::TranscodeConfig;
//! use csv_cleaner::processor::{CleanerProcessor, ProcessOutcome};
//! use std::path::Path;
//!
//! let mut processor = CleanerProcessor::new(TranscodeConfig::default());
//! let outcome = processor
//!     .process_file(Path::new("raw.txt"), Path::new("clean.csv"), Some(Path::new("failed")))
//!     .unwrap();
//!
//! if let ProcessOutcome::Success { stats, .. } = outcome {
//!     println!("{} records written", stats.records);
//! }
//! ```

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::TranscodeConfig;
use crate::error::CleanerError;
use crate::transcoder::{TranscodeStats, Transcoder};

/// Result of processing one input.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The transformed content was written to the success destination.
    Success {
        stats: TranscodeStats,
        elapsed: Duration,
    },
    /// The transcode failed and nothing was written to the success
    /// destination.
    Failure {
        error: CleanerError,
        /// Where the untouched original was copied, if a failure directory
        /// was configured.
        routed_to: Option<PathBuf>,
    },
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success { .. })
    }
}

/// Runs the transcoder over files or arbitrary streams.
pub struct CleanerProcessor {
    transcoder: Transcoder,
}

impl CleanerProcessor {
    pub fn new(config: TranscodeConfig) -> Self {
        debug!(
            field_separator = config.field_separator(),
            line_terminator = config.line_terminator(),
            trailing_record = %config.trailing_record(),
            "Creating processor"
        );
        Self {
            transcoder: Transcoder::new(config),
        }
    }

    pub fn config(&self) -> &TranscodeConfig {
        self.transcoder.config()
    }

    /// Transcode an unbuffered stream pair, such as stdin and stdout.
    ///
    /// There is nowhere to route a failure to, so errors are returned as is.
    pub fn process_stream<R: Read, W: Write>(
        &mut self,
        input: R,
        output: W,
    ) -> Result<TranscodeStats, CleanerError> {
        let mut reader = BufReader::new(input);
        let mut writer = BufWriter::new(output);
        let stats = self.transcoder.transcode(&mut reader, &mut writer)?;
        log_lost_content(None, &stats);
        Ok(stats)
    }

    /// Transcode `input` into `output`, routing the original to `failure_dir`
    /// if the transcode fails.
    ///
    /// Transcode failures are reported through [`ProcessOutcome::Failure`].
    /// An `Err` is only returned when routing itself fails, i.e. the original
    /// cannot be copied into the failure directory.
    pub fn process_file(
        &mut self,
        input: &Path,
        output: &Path,
        failure_dir: Option<&Path>,
    ) -> Result<ProcessOutcome, CleanerError> {
        let started = Instant::now();

        match self.transcode_file(input, output) {
            Ok(stats) => {
                let elapsed = started.elapsed();
                info!(
                    input = %input.display(),
                    output = %output.display(),
                    records = stats.records,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Transferred to success"
                );
                log_lost_content(Some(input), &stats);
                Ok(ProcessOutcome::Success { stats, elapsed })
            }
            Err(error) => {
                warn!(input = %input.display(), error = %error, "Transferred to failure");
                let routed_to = match failure_dir {
                    Some(dir) => Some(route_to_failure(input, dir)?),
                    None => None,
                };
                Ok(ProcessOutcome::Failure { error, routed_to })
            }
        }
    }

    fn transcode_file(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<TranscodeStats, CleanerError> {
        let mut reader = BufReader::new(File::open(input)?);

        let parent = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(parent)?;

        let stats = {
            let mut writer = BufWriter::new(staged.as_file_mut());
            self.transcoder.transcode(&mut reader, &mut writer)?
        };

        staged.persist(output).map_err(|e| e.error)?;
        Ok(stats)
    }
}

/// Copy the untouched original into `failure_dir`, creating it if needed.
///
/// An existing file is never replaced: `data.txt` becomes `data-1.txt`,
/// `data-2.txt` and so on when the name is taken.
fn route_to_failure(input: &Path, failure_dir: &Path) -> Result<PathBuf, CleanerError> {
    fs::create_dir_all(failure_dir)?;
    let mut source = File::open(input)?;
    let (mut target, destination) = create_unique(failure_dir, input)?;
    io::copy(&mut source, &mut target)?;
    debug!(destination = %destination.display(), "Original routed to failure directory");
    Ok(destination)
}

fn create_unique(dir: &Path, input: &Path) -> io::Result<(File, PathBuf)> {
    let name = Path::new(input.file_name().unwrap_or_else(|| OsStr::new("input")));
    let stem = name.file_stem().unwrap_or(name.as_os_str());

    for attempt in 0u32.. {
        let candidate = if attempt == 0 {
            dir.join(name)
        } else {
            let mut numbered = stem.to_os_string();
            numbered.push(format!("-{}", attempt));
            if let Some(extension) = name.extension() {
                numbered.push(".");
                numbered.push(extension);
            }
            dir.join(numbered)
        };

        match File::options().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free name left in failure directory",
    ))
}

fn log_lost_content(input: Option<&Path>, stats: &TranscodeStats) {
    if stats.lost_content() {
        let input = input.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
        warn!(
            input = %input,
            bytes = stats.dropped_trailing_bytes,
            "Unterminated final record dropped"
        );
    }
}
