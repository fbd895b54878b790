//! CLI argument parsing module
//!
//! Handles command-line argument parsing using `clap` derive macros.
//! This module defines the [`Args`] struct, its validation logic, and the
//! [`RunMode`] the binary dispatches on.

use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

use crate::batch::{comparable_path, output_file_name};
use crate::config::{ProfileFile, TrailingRecord, TranscodeConfig};
use crate::error::CleanerError;

/// How the inputs on the command line are processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// No input files: read stdin, write `output` or stdout.
    Stream { output: Option<PathBuf> },
    /// One input file written to one output file.
    Single { input: PathBuf, output: PathBuf },
    /// Several inputs, each written into `output_dir`.
    Batch {
        inputs: Vec<PathBuf>,
        output_dir: PathBuf,
    },
}

/// Command-line arguments for csv-cleaner.
///
/// Use the `validate()` method after parsing to ensure argument combinations
/// are valid.
///
/// # Example
///
/// ```rust,ignore
/// use clap::Parser;
/// use csv_cleaner::cli::Args;
///
/// let args = Args::parse();
/// args.validate()?;
/// ```
#[derive(Parser, Debug)]
#[command(name = "csv-cleaner")]
#[command(about = "Convert custom-delimited flat text records into quoted CSV")]
#[command(version)]
pub struct Args {
    /// Input files (reads stdin when none are given)
    pub inputs: Vec<PathBuf>,

    /// Output file, or output directory when several inputs are given
    /// (writes stdout when omitted with stdin input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Field separator, possibly several characters [default: ~^~]
    #[arg(short = 's', long)]
    pub field_separator: Option<String>,

    /// Line terminator marking the end of a record [default: -|]
    #[arg(short = 'l', long)]
    pub line_terminator: Option<String>,

    /// What to do with an unterminated record at the end of the input [default: drop]
    #[arg(long, value_enum)]
    pub trailing_record: Option<TrailingRecord>,

    /// JSON profile providing defaults for the delimiter options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the untouched originals of failed inputs
    #[arg(long)]
    pub failure_dir: Option<PathBuf>,

    /// Number of inputs transcoded concurrently
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Print a statistics report to stderr
    #[arg(long, default_value = "false")]
    pub report: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Validate argument combinations.
    ///
    /// This method checks that:
    /// - explicit delimiters are not empty
    /// - `--jobs` is at least 1
    /// - several inputs come with an `--output` directory
    /// - a single input is not also its own output
    /// - `--failure-dir` is only used with input files
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the argument combination is valid
    /// - `Err(CleanerError::InvalidArgument)` describing the first problem found
    pub fn validate(&self) -> Result<(), CleanerError> {
        let invalid = |message: String| -> Result<(), CleanerError> {
            Err(CleanerError::InvalidArgument(message))
        };

        if matches!(self.field_separator.as_deref(), Some("")) {
            return invalid("--field-separator must not be empty".to_string());
        }

        if matches!(self.line_terminator.as_deref(), Some("")) {
            return invalid("--line-terminator must not be empty".to_string());
        }

        if self.jobs == 0 {
            return invalid("--jobs must be at least 1".to_string());
        }

        match (self.inputs.as_slice(), &self.output) {
            ([_, _, ..], None) => {
                return invalid(
                    "--output directory is required when several inputs are given".to_string(),
                );
            }
            ([_, _, ..], Some(output)) if output.is_file() => {
                return invalid(format!(
                    "--output {} must be a directory when several inputs are given",
                    output.display()
                ));
            }
            ([input], Some(output))
                if !output.is_dir() && comparable_path(input) == comparable_path(output) =>
            {
                return invalid(format!(
                    "--output {} would overwrite the input",
                    output.display()
                ));
            }
            _ => {}
        }

        if self.inputs.is_empty() && self.failure_dir.is_some() {
            return invalid("--failure-dir requires input files".to_string());
        }

        Ok(())
    }

    /// Resolve the transcoder configuration from the profile file (if any)
    /// and the explicit flags, which take precedence.
    pub fn transcode_config(&self) -> Result<TranscodeConfig, CleanerError> {
        let profile = match &self.config {
            Some(path) => ProfileFile::from_json_file(path)?,
            None => ProfileFile::default(),
        };

        profile.resolve(
            self.field_separator.as_deref(),
            self.line_terminator.as_deref(),
            self.trailing_record,
        )
    }

    /// Decide how the inputs are processed. Call `validate()` first.
    pub fn run_mode(&self) -> RunMode {
        match (self.inputs.as_slice(), &self.output) {
            ([], output) => RunMode::Stream {
                output: output.clone(),
            },
            ([input], Some(output)) if !output.is_dir() => RunMode::Single {
                input: input.clone(),
                output: output.clone(),
            },
            ([input], None) => RunMode::Single {
                input: input.clone(),
                output: default_output_path(input),
            },
            (inputs, output) => RunMode::Batch {
                inputs: inputs.to_vec(),
                output_dir: output.clone().unwrap_or_else(|| PathBuf::from(".")),
            },
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Output next to the input, named by [`output_file_name`].
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(output_file_name(input))
}
