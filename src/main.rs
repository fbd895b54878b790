//! csv-cleaner - convert custom-delimited flat text records into quoted CSV
//!
//! This CLI tool has three ways of running:
//! - **Stream**: no input files; read stdin and write stdout (or `--output`)
//! - **Single**: one input file written to one output file
//! - **Batch**: several input files written into an output directory,
//!   optionally `--jobs` at a time
//!
//! Inputs that fail to transcode are routed to `--failure-dir` untouched.
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Configuration/argument error |
//! | 3 | File I/O error |
//! | 4 | One or more inputs routed to failure |
//! | 130 | Interrupted |

use clap::Parser;
use std::fs::File;
use std::io;
use std::process::ExitCode;

use csv_cleaner::batch::{plan_jobs, process_batch_until, BatchSummary};
use csv_cleaner::cli::{Args, RunMode};
use csv_cleaner::config::TranscodeConfig;
use csv_cleaner::error::CleanerError;
use csv_cleaner::processor::{CleanerProcessor, ProcessOutcome};
use csv_cleaner::transcoder::TranscodeStats;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code for success
const EXIT_SUCCESS: u8 = 0;
/// Exit code for configuration/argument errors
const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for file I/O errors
const EXIT_IO_ERROR: u8 = 3;
/// Exit code when inputs were routed to failure
const EXIT_ROUTED_FAILURE: u8 = 4;
/// Exit code after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        eprintln!("  Hint: Use --help for usage information");
        return ExitCode::from(error_to_exit_code(&e));
    }

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(error_to_exit_code(&e))
        }
    }
}

/// Main application logic: resolve the configuration and dispatch on the
/// run mode.
async fn run(args: Args) -> Result<(), CleanerError> {
    let config = args.transcode_config()?;

    match args.run_mode() {
        RunMode::Stream { output } => run_stream(config, output.as_deref(), args.report),
        RunMode::Single { input, output } => {
            let mut processor = CleanerProcessor::new(config);
            let outcome = processor.process_file(&input, &output, args.failure_dir.as_deref())?;
            match outcome {
                ProcessOutcome::Success { stats, .. } => {
                    print_report(args.report, &stats);
                    Ok(())
                }
                ProcessOutcome::Failure { error, .. } => Err(error),
            }
        }
        RunMode::Batch { inputs, output_dir } => {
            std::fs::create_dir_all(&output_dir)?;
            let jobs = plan_jobs(inputs, &output_dir)?;

            let results = process_batch_until(
                config,
                jobs,
                args.failure_dir.clone(),
                args.jobs,
                interrupted(),
            )
            .await;

            for result in &results {
                match &result.outcome {
                    Ok(ProcessOutcome::Success { stats, .. }) => {
                        if args.report {
                            eprintln!("{}:", result.job.input.display());
                        }
                        print_report(args.report, stats);
                    }
                    Ok(ProcessOutcome::Failure { error, .. }) => {
                        eprintln!("Failed: {}: {}", result.job.input.display(), error);
                    }
                    Err(CleanerError::Interrupted) => {
                        eprintln!("Skipped: {}", result.job.input.display());
                    }
                    Err(e) => {
                        eprintln!("Failed to route {}: {}", result.job.input.display(), e);
                    }
                }
            }

            let summary = BatchSummary::from_results(&results);
            if summary.interrupted > 0 {
                return Err(CleanerError::Interrupted);
            }
            if summary.failed > 0 {
                return Err(CleanerError::FailedInputs(summary.failed));
            }
            Ok(())
        }
    }
}

/// Completes on Ctrl-C. Never completes if the signal handler cannot be
/// installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Transcode stdin into stdout or a named output file.
fn run_stream(
    config: TranscodeConfig,
    output: Option<&std::path::Path>,
    report: bool,
) -> Result<(), CleanerError> {
    let mut processor = CleanerProcessor::new(config);
    let stdin = io::stdin().lock();

    let stats = match output {
        Some(path) => processor.process_stream(stdin, File::create(path)?)?,
        None => processor.process_stream(stdin, io::stdout().lock())?,
    };

    info!(records = stats.records, "Stream transcoded");
    print_report(report, &stats);
    Ok(())
}

fn print_report(enabled: bool, stats: &TranscodeStats) {
    if enabled {
        eprintln!("{}", stats);
    }
}

/// Map an error to the process exit code.
fn error_to_exit_code(error: &CleanerError) -> u8 {
    match error {
        CleanerError::Configuration(_) => EXIT_CONFIG_ERROR,
        CleanerError::InvalidArgument(_) => EXIT_CONFIG_ERROR,
        CleanerError::Json(_) => EXIT_CONFIG_ERROR,
        CleanerError::Io(_) => EXIT_IO_ERROR,
        CleanerError::Csv(_) => EXIT_IO_ERROR,
        CleanerError::UnterminatedRecord { .. } => EXIT_ROUTED_FAILURE,
        CleanerError::FailedInputs(_) => EXIT_ROUTED_FAILURE,
        CleanerError::Interrupted => EXIT_INTERRUPTED,
    }
}
