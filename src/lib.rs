//! csv-cleaner library
//!
//! Streaming conversion of custom-delimited flat text records into quoted
//! CSV. The [`transcoder`] module holds the core algorithm; [`processor`] and
//! [`batch`] host it over files, and [`cli`] backs the command-line tool.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod processor;
pub mod transcoder;

pub use config::{TrailingRecord, TranscodeConfig};
pub use error::CleanerError;
pub use transcoder::{transcode, TranscodeStats, Transcoder};
