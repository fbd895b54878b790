//! Transcoder configuration
//!
//! Holds the two delimiter strings and the trailing record policy. A
//! [`TranscodeConfig`] is validated once, when it is built, so the transcoder
//! itself never sees an empty separator.
//!
//! Configuration can also be loaded from a JSON profile file:
//!
//! ```json
//! {
//!     "field_separator": "~^~",
//!     "line_terminator": "-|",
//!     "trailing_record": "drop"
//! }
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::CleanerError;

/// Default field separator.
pub const DEFAULT_FIELD_SEPARATOR: &str = "~^~";

/// Default line terminator.
pub const DEFAULT_LINE_TERMINATOR: &str = "-|";

/// What to do with content left in the accumulator when the input ends
/// without a final line terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingRecord {
    /// Silently discard the partial record.
    #[default]
    Drop,
    /// Emit the partial record as if it had been terminated.
    Flush,
    /// Fail the transcode with an unterminated record error.
    Reject,
}

impl fmt::Display for TrailingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrailingRecord::Drop => "drop",
            TrailingRecord::Flush => "flush",
            TrailingRecord::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Validated transcoder configuration.
///
/// Construct with [`TranscodeConfig::new`], which rejects empty delimiters.
///
/// # Example
///
/// ```
/// use csv_cleaner::config::{TranscodeConfig, TrailingRecord};
///
/// let config = TranscodeConfig::new("|", ";;").unwrap();
/// assert_eq!(config.field_separator(), "|");
/// assert_eq!(config.trailing_record(), TrailingRecord::Drop);
///
/// assert!(TranscodeConfig::new("", "-|").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeConfig {
    field_separator: String,
    line_terminator: String,
    trailing_record: TrailingRecord,
}

impl TranscodeConfig {
    /// Build a configuration, failing fast on empty delimiters.
    pub fn new(
        field_separator: impl Into<String>,
        line_terminator: impl Into<String>,
    ) -> Result<Self, CleanerError> {
        let field_separator = field_separator.into();
        let line_terminator = line_terminator.into();

        if field_separator.is_empty() {
            return Err(CleanerError::Configuration(
                "field separator must not be empty".to_string(),
            ));
        }
        if line_terminator.is_empty() {
            return Err(CleanerError::Configuration(
                "line terminator must not be empty".to_string(),
            ));
        }

        Ok(Self {
            field_separator,
            line_terminator,
            trailing_record: TrailingRecord::default(),
        })
    }

    /// Replace the trailing record policy.
    pub fn with_trailing_record(mut self, policy: TrailingRecord) -> Self {
        self.trailing_record = policy;
        self
    }

    pub fn field_separator(&self) -> &str {
        &self.field_separator
    }

    pub fn line_terminator(&self) -> &str {
        &self.line_terminator
    }

    pub fn trailing_record(&self) -> TrailingRecord {
        self.trailing_record
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            field_separator: DEFAULT_FIELD_SEPARATOR.to_string(),
            line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
            trailing_record: TrailingRecord::Drop,
        }
    }
}

/// Contents of a JSON profile file. All keys are optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFile {
    pub field_separator: Option<String>,
    pub line_terminator: Option<String>,
    pub trailing_record: Option<TrailingRecord>,
}

impl ProfileFile {
    /// Load a profile from a JSON file.
    ///
    /// # Errors
    ///
    /// - [`CleanerError::Io`] if the file cannot be opened
    /// - [`CleanerError::Json`] if the file is not a valid profile
    pub fn from_json_file(path: &Path) -> Result<Self, CleanerError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let profile: ProfileFile = serde_json::from_reader(reader)?;
        Ok(profile)
    }

    /// Merge this profile with explicit overrides and validate the result.
    ///
    /// Overrides win over profile values; anything still unset falls back to
    /// the defaults.
    pub fn resolve(
        &self,
        field_separator: Option<&str>,
        line_terminator: Option<&str>,
        trailing_record: Option<TrailingRecord>,
    ) -> Result<TranscodeConfig, CleanerError> {
        let field_separator = field_separator
            .or(self.field_separator.as_deref())
            .unwrap_or(DEFAULT_FIELD_SEPARATOR);
        let line_terminator = line_terminator
            .or(self.line_terminator.as_deref())
            .unwrap_or(DEFAULT_LINE_TERMINATOR);
        let trailing_record = trailing_record
            .or(self.trailing_record)
            .unwrap_or_default();

        Ok(TranscodeConfig::new(field_separator, line_terminator)?
            .with_trailing_record(trailing_record))
    }
}
