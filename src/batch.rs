//! Batch processing
//!
//! Runs several independent file transcodes concurrently. Each input gets its
//! own [`CleanerProcessor`] on a blocking thread; a semaphore caps how many
//! run at once. A single transcode is never split across threads.
//!
//! When the batch is interrupted, jobs that have not started are skipped and
//! the batch waits for running transcodes to finish, so no staged output is
//! left behind.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::TranscodeConfig;
use crate::error::CleanerError;
use crate::processor::{CleanerProcessor, ProcessOutcome};

/// One input and the destination of its transformed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl BatchJob {
    /// Job writing `<output_dir>/<output_file_name(input)>`.
    pub fn into_dir(input: PathBuf, output_dir: &Path) -> Self {
        let output = output_dir.join(output_file_name(&input));
        Self { input, output }
    }
}

/// `data.txt` → `data.csv`; `data.csv` → `data.clean.csv` so an input is
/// never its own output.
pub fn output_file_name(input: &Path) -> OsString {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    if input.extension().is_some_and(|ext| ext == "csv") {
        name.push(".clean.csv");
    } else {
        name.push(".csv");
    }
    name
}

/// Build one job per input, all writing into `output_dir`.
///
/// # Errors
///
/// [`CleanerError::InvalidArgument`] if two inputs map to the same output
/// file, or an output would overwrite one of the inputs.
pub fn plan_jobs(
    inputs: Vec<PathBuf>,
    output_dir: &Path,
) -> Result<Vec<BatchJob>, CleanerError> {
    let jobs: Vec<BatchJob> = inputs
        .into_iter()
        .map(|input| BatchJob::into_dir(input, output_dir))
        .collect();

    let inputs: HashMap<PathBuf, &Path> = jobs
        .iter()
        .map(|job| (comparable_path(&job.input), job.input.as_path()))
        .collect();
    let mut outputs: HashMap<PathBuf, &Path> = HashMap::with_capacity(jobs.len());

    for job in &jobs {
        let output = comparable_path(&job.output);
        if let Some(overwritten) = inputs.get(&output) {
            return Err(CleanerError::InvalidArgument(format!(
                "output {} would overwrite input {}",
                job.output.display(),
                overwritten.display()
            )));
        }
        if let Some(previous) = outputs.insert(output, job.input.as_path()) {
            return Err(CleanerError::InvalidArgument(format!(
                "inputs {} and {} would both be written to {}",
                previous.display(),
                job.input.display(),
                job.output.display()
            )));
        }
    }

    Ok(jobs)
}

/// `path` with its parent directory resolved, so `a.csv` and `./a.csv`
/// compare equal. Paths whose parent does not exist are used as given.
pub(crate) fn comparable_path(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Outcome of one batch job, in the same order the jobs were submitted.
#[derive(Debug)]
pub struct BatchResult {
    pub job: BatchJob,
    pub outcome: Result<ProcessOutcome, CleanerError>,
}

/// Counts of routed inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs skipped because the batch was interrupted before they started.
    pub interrupted: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                match &result.outcome {
                    Ok(outcome) if outcome.is_success() => summary.succeeded += 1,
                    Err(CleanerError::Interrupted) => summary.interrupted += 1,
                    _ => summary.failed += 1,
                }
                summary
            })
    }
}

/// Process `jobs` with at most `concurrency` transcodes in flight.
pub async fn process_batch(
    config: TranscodeConfig,
    jobs: Vec<BatchJob>,
    failure_dir: Option<PathBuf>,
    concurrency: usize,
) -> Vec<BatchResult> {
    process_batch_until(config, jobs, failure_dir, concurrency, std::future::pending()).await
}

/// Like [`process_batch`], but stops starting new jobs once `shutdown`
/// completes. Jobs already running are awaited; the skipped ones report
/// [`CleanerError::Interrupted`].
pub async fn process_batch_until<F>(
    config: TranscodeConfig,
    jobs: Vec<BatchJob>,
    failure_dir: Option<PathBuf>,
    concurrency: usize,
    shutdown: F,
) -> Vec<BatchResult>
where
    F: Future<Output = ()>,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let failure_dir = failure_dir.map(Arc::new);
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let permits = Arc::clone(&permits);
        let config = config.clone();
        let failure_dir = failure_dir.clone();
        let task_job = job.clone();

        let handle = tokio::spawn(async move {
            // Closed only on shutdown.
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| CleanerError::Interrupted)?;

            tokio::task::spawn_blocking(move || {
                let mut processor = CleanerProcessor::new(config);
                processor.process_file(
                    &task_job.input,
                    &task_job.output,
                    failure_dir.as_deref().map(PathBuf::as_path),
                )
            })
            .await
            .map_err(|e| CleanerError::Io(std::io::Error::other(e)))?
        });
        handles.push((job, handle));
    }

    tokio::pin!(shutdown);
    let mut shutting_down = false;
    let mut results = Vec::with_capacity(handles.len());

    for (job, mut handle) in handles {
        let joined = loop {
            if shutting_down {
                break (&mut handle).await;
            }
            tokio::select! {
                joined = &mut handle => break joined,
                _ = &mut shutdown => {
                    shutting_down = true;
                    permits.close();
                    warn!("Batch interrupted, waiting for running transcodes");
                }
            }
        };

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => Err(CleanerError::Io(std::io::Error::other(e))),
        };
        results.push(BatchResult { job, outcome });
    }

    let summary = BatchSummary::from_results(&results);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        interrupted = summary.interrupted,
        "Batch complete"
    );
    results
}
