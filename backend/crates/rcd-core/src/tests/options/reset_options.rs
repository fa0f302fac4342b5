use crate::{CoreError, RawOptions, ResetOptions, ShutdownManner};

use googletest::assert_that;
use googletest::prelude::{contains_substring, err, pat};

#[test]
fn given_all_reset_options_when_parsed_then_typed_fields_set() {
    let mut raw = RawOptions::new();
    raw.insert("listening-ports", "3128");
    raw.insert("shutdown-manner", "gracefully");
    raw.insert("worker-count", "2");
    raw.insert("disker-count", "0");
    raw.insert("memory-checker-use", "no");

    let options = ResetOptions::from_raw(&raw).unwrap();

    assert_eq!(
        options,
        ResetOptions {
            listening_ports: Some(vec![3128]),
            shutdown_manner: Some(ShutdownManner::Gracefully),
            workers: Some(2),
            diskers: Some(0),
            memory_checker: Some(false),
        }
    );
}

#[test]
fn given_no_options_when_parsed_then_all_absent() {
    assert_eq!(
        ResetOptions::from_raw(&RawOptions::new()).unwrap(),
        ResetOptions::default()
    );
}

#[test]
fn given_bad_manner_when_parsed_then_error() {
    let mut raw = RawOptions::new();
    raw.insert("shutdown-manner", "eventually");

    assert!(ResetOptions::from_raw(&raw).is_err());
}

#[test]
fn given_absurd_worker_count_when_parsed_then_invalid_option() {
    let mut raw = RawOptions::new();
    raw.insert("worker-count", "4294967295");
    raw.insert("disker-count", "1");

    assert_that!(
        ResetOptions::from_raw(&raw),
        err(pat!(CoreError::InvalidOption {
            message: contains_substring("at most 128"),
            ..
        }))
    );
}
