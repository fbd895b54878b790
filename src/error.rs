//! Error module
//!
//! Defines the error type shared by the transcoder core, the processor that
//! routes files, and the command-line front end.

use thiserror::Error;

/// The main error type for csv-cleaner.
///
/// # Error Categories
///
/// - **Configuration errors**: empty separators or bad profile values, raised
///   before any stream is touched
/// - **I/O errors**: any failure reading the input or writing the output; these
///   abort the transcode immediately
/// - **Record errors**: an unterminated trailing record when the caller asked
///   for [`TrailingRecord::Reject`](crate::config::TrailingRecord::Reject)
/// - **Argument errors**: invalid command-line combinations
///
/// # Example
///
/// ```rust,ignore
/// use csv_cleaner::error::CleanerError;
///
/// fn example() -> Result<(), CleanerError> {
///     // I/O errors convert automatically
///     let file = std::fs::File::open("nonexistent.txt")?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CleanerError {
    /// Invalid transcoder configuration.
    ///
    /// Raised when the field separator or line terminator is empty, or a
    /// profile file carries a value that cannot be used.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// General I/O error.
    ///
    /// Covers reading the input stream, writing the output stream, and the
    /// file system operations performed while routing results.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended in the middle of a logical record.
    ///
    /// Only produced when the trailing record policy is `Reject`; the default
    /// policy drops the partial record silently.
    #[error("Unterminated record at end of input (line {line}, {bytes} bytes pending)")]
    UnterminatedRecord {
        /// Physical line number of the last line read.
        line: u64,
        /// Size of the pending partial record in bytes.
        bytes: usize,
    },

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error from a profile file.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more inputs of a run were routed to failure.
    ///
    /// Each failure has already been logged; this error only carries the
    /// count so the process can exit with a distinct code.
    #[error("{0} input(s) routed to failure")]
    FailedInputs(usize),

    /// The run was interrupted before all inputs were processed.
    #[error("Interrupted")]
    Interrupted,
}
