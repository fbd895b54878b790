//! Integration tests for file processing and routing

use csv_cleaner::batch::{plan_jobs, process_batch, BatchJob, BatchSummary};
use csv_cleaner::config::{TrailingRecord, TranscodeConfig};
use csv_cleaner::error::CleanerError;
use csv_cleaner::processor::{CleanerProcessor, ProcessOutcome};

use std::fs;
use std::io::{BufWriter, Write};
use tempfile::tempdir;

const SAMPLE: &str = "field1~^~A\nmultiline\nfield~^~field3-|\nfield1~^~field2~^~field3-|\n";
const SAMPLE_CSV: &str =
    "\"field1\",\"A\nmultiline\nfield\",\"field3\"\n\"field1\",\"field2\",\"field3\"\n";

/// Test that a large input is transcoded record by record.
///
/// 1. Write a few megabytes of repeated sample records
/// 2. Process the file
/// 3. Verify the record count and that the output is the repeated CSV sample
#[test]
fn test_large_file_streams_through() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("large_raw.txt");
    let output = dir.path().join("large_clean.csv");
    let repeats = 50_000;

    {
        let mut writer = BufWriter::new(fs::File::create(&input).unwrap());
        for _ in 0..repeats {
            writer.write_all(SAMPLE.as_bytes()).unwrap();
        }
        writer.flush().unwrap();
    }

    let mut processor = CleanerProcessor::new(TranscodeConfig::default());
    let outcome = processor.process_file(&input, &output, None).unwrap();

    let ProcessOutcome::Success { stats, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(stats.records, 2 * repeats as u64);
    assert_eq!(stats.fields, 6 * repeats as u64);
    assert_eq!(stats.physical_lines, 4 * repeats as u64);

    let content = fs::read_to_string(&output).unwrap();
    assert_eq!(content.len(), SAMPLE_CSV.len() * repeats);
    assert!(content.starts_with(SAMPLE_CSV));
    assert!(content.ends_with(SAMPLE_CSV));
}

/// Test that one processor can be reused for several files.
#[test]
fn test_processor_reused_for_several_files() {
    let dir = tempdir().unwrap();
    let mut processor = CleanerProcessor::new(TranscodeConfig::default());

    for i in 0..3 {
        let input = dir.path().join(format!("raw{}.txt", i));
        let output = dir.path().join(format!("clean{}.csv", i));
        fs::write(&input, SAMPLE).unwrap();

        let outcome = processor.process_file(&input, &output, None).unwrap();
        assert!(outcome.is_success());
        assert_eq!(fs::read_to_string(&output).unwrap(), SAMPLE_CSV);
    }
}

/// Test that a rejected input leaves the success side untouched and the
/// original lands in the failure directory byte for byte.
#[test]
fn test_rejected_input_routed_to_failure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.txt");
    let output = dir.path().join("out").join("broken.csv");
    let failure_dir = dir.path().join("failure");
    fs::create_dir_all(output.parent().unwrap()).unwrap();

    let original = b"ok~^~row-|\r\nhalf~^~a row\n\xFF".to_vec();
    fs::write(&input, &original).unwrap();

    let config = TranscodeConfig::default().with_trailing_record(TrailingRecord::Reject);
    let mut processor = CleanerProcessor::new(config);
    let outcome = processor
        .process_file(&input, &output, Some(&failure_dir))
        .unwrap();

    match outcome {
        ProcessOutcome::Failure {
            error: CleanerError::UnterminatedRecord { line, .. },
            routed_to: Some(routed),
        } => {
            assert_eq!(line, 3);
            assert_eq!(fs::read(routed).unwrap(), original);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(!output.exists());
    // Only the routed original is left behind; no staging files remain.
    assert_eq!(fs::read_dir(output.parent().unwrap()).unwrap().count(), 0);
}

/// Test that the same input succeeds under the default policy and reports
/// the dropped bytes.
#[test]
fn test_default_policy_drops_trailing_record() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tail.txt");
    let output = dir.path().join("tail.csv");
    fs::write(&input, "ok~^~row-|\nhalf~^~a row").unwrap();

    let mut processor = CleanerProcessor::new(TranscodeConfig::default());
    let outcome = processor.process_file(&input, &output, None).unwrap();

    let ProcessOutcome::Success { stats, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(stats.dropped_trailing_bytes, "half~^~a row".len());
    assert_eq!(fs::read_to_string(&output).unwrap(), "\"ok\",\"row\"\n");
}

/// Test batch processing with a mix of good and failing inputs.
///
/// 1. Create three good inputs and one that is rejected
/// 2. Run the batch with two concurrent jobs
/// 3. Verify outputs, failure routing and the summary
#[tokio::test]
async fn test_batch_routes_each_input() {
    let dir = tempdir().unwrap();
    let in_dir = dir.path().join("in");
    let out_dir = dir.path().join("out");
    let failure_dir = dir.path().join("failure");
    fs::create_dir_all(&in_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    let mut jobs = Vec::new();
    for name in ["a", "b", "c"] {
        let input = in_dir.join(format!("{}.txt", name));
        fs::write(&input, SAMPLE).unwrap();
        jobs.push(BatchJob::into_dir(input, &out_dir));
    }
    let bad = in_dir.join("bad.txt");
    fs::write(&bad, "never terminated").unwrap();
    jobs.push(BatchJob::into_dir(bad, &out_dir));

    let config = TranscodeConfig::default().with_trailing_record(TrailingRecord::Reject);
    let results = process_batch(config, jobs, Some(failure_dir.clone()), 2).await;

    assert_eq!(
        BatchSummary::from_results(&results),
        BatchSummary {
            succeeded: 3,
            failed: 1,
            interrupted: 0
        }
    );

    for name in ["a", "b", "c"] {
        let content = fs::read_to_string(out_dir.join(format!("{}.csv", name))).unwrap();
        assert_eq!(content, SAMPLE_CSV);
    }
    assert!(!out_dir.join("bad.csv").exists());
    assert_eq!(
        fs::read_to_string(failure_dir.join("bad.txt")).unwrap(),
        "never terminated"
    );
}

/// Test that a batch of `.csv` inputs written into their own directory never
/// replaces an original.
///
/// 1. Create two `.csv` inputs in one directory
/// 2. Plan and run the batch into that same directory
/// 3. Verify the originals are untouched and the outputs sit beside them
#[tokio::test]
async fn test_batch_into_input_directory_keeps_originals() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    fs::write(&a, "x~^~y-|\n").unwrap();
    fs::write(&b, "one-|\n").unwrap();

    let jobs = plan_jobs(vec![a.clone(), b.clone()], dir.path()).unwrap();
    let results = process_batch(TranscodeConfig::default(), jobs, None, 2).await;
    assert_eq!(BatchSummary::from_results(&results).succeeded, 2);

    assert_eq!(fs::read_to_string(&a).unwrap(), "x~^~y-|\n");
    assert_eq!(fs::read_to_string(&b).unwrap(), "one-|\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("a.clean.csv")).unwrap(),
        "\"x\",\"y\"\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("b.clean.csv")).unwrap(),
        "\"one\"\n"
    );
}

/// Test that inputs sharing a file name are refused before anything is
/// written.
#[test]
fn test_batch_refuses_colliding_outputs() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();
    for sub in ["d1", "d2"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join("data.txt"), "a-|\n").unwrap();
    }

    let result = plan_jobs(
        vec![
            dir.path().join("d1").join("data.txt"),
            dir.path().join("d2").join("data.txt"),
        ],
        &out_dir,
    );

    assert!(matches!(result, Err(CleanerError::InvalidArgument(_))));
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
}

/// Test that a file using bare carriage returns as line breaks transcodes
/// like its `\n` counterpart.
#[test]
fn test_carriage_return_only_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("classic.txt");
    let output = dir.path().join("classic.csv");
    fs::write(&input, SAMPLE.replace('\n', "\r")).unwrap();

    let mut processor = CleanerProcessor::new(TranscodeConfig::default());
    let outcome = processor.process_file(&input, &output, None).unwrap();

    assert!(outcome.is_success());
    assert_eq!(fs::read_to_string(&output).unwrap(), SAMPLE_CSV);
}
