//! Property-based tests for CLI argument parsing
//!
//! Validates that delimiter flags round-trip through clap and that the
//! resolved configuration honors them.

use clap::Parser;
use proptest::prelude::*;
use std::path::PathBuf;

use csv_cleaner::cli::{Args, RunMode};
use csv_cleaner::config::TrailingRecord;

/// Strategy for generating non-empty delimiters that do not look like flags
fn delimiter_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[~^|;:#@]{1,4}".prop_map(|s| s),
        "<[A-Z]{1,5}>".prop_map(|s| s),
        Just("\t".to_string()),
        Just("¦".to_string()),
    ]
}

/// Strategy for generating input file names
fn input_file_strategy() -> impl Strategy<Value = PathBuf> {
    "[a-z][a-z0-9]{0,10}\\.txt".prop_map(PathBuf::from)
}

fn trailing_record_strategy() -> impl Strategy<Value = (&'static str, TrailingRecord)> {
    prop_oneof![
        Just(("drop", TrailingRecord::Drop)),
        Just(("flush", TrailingRecord::Flush)),
        Just(("reject", TrailingRecord::Reject)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Explicit delimiters are parsed verbatim and end up in the configuration.
    #[test]
    fn property_delimiters_resolve_into_config(
        separator in delimiter_strategy(),
        terminator in delimiter_strategy(),
        (policy_name, policy) in trailing_record_strategy(),
    ) {
        let args = Args::try_parse_from([
            "csv-cleaner".to_string(),
            format!("--field-separator={}", separator),
            format!("--line-terminator={}", terminator),
            "--trailing-record".to_string(),
            policy_name.to_string(),
        ])
        .unwrap();

        prop_assert!(args.validate().is_ok());
        let config = args.transcode_config().unwrap();
        prop_assert_eq!(config.field_separator(), separator.as_str());
        prop_assert_eq!(config.line_terminator(), terminator.as_str());
        prop_assert_eq!(config.trailing_record(), policy);
    }

    // A single input without --output is written next to itself.
    #[test]
    fn property_single_input_defaults_to_csv_sibling(input in input_file_strategy()) {
        let args = Args::try_parse_from(["csv-cleaner".to_string(), input.display().to_string()])
            .unwrap();

        prop_assert!(args.validate().is_ok());
        prop_assert_eq!(
            args.run_mode(),
            RunMode::Single { output: input.with_extension("csv"), input }
        );
    }

    // Several inputs without an output directory are rejected.
    #[test]
    fn property_several_inputs_need_output(
        inputs in prop::collection::vec(input_file_strategy(), 2..5)
    ) {
        let mut argv = vec!["csv-cleaner".to_string()];
        argv.extend(inputs.iter().map(|p| p.display().to_string()));
        let args = Args::try_parse_from(argv).unwrap();

        prop_assert!(args.validate().is_err());
    }

    // Any positive job count is accepted; zero is not.
    #[test]
    fn property_jobs_validation(jobs in 0usize..64) {
        let args = Args::try_parse_from(["csv-cleaner".to_string(), format!("--jobs={}", jobs)])
            .unwrap();
        prop_assert_eq!(args.validate().is_ok(), jobs > 0);
    }
}
