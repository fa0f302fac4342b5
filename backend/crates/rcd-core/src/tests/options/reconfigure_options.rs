use crate::{RawOptions, ReconfigureOptions};

#[test]
fn given_counts_when_parsed_then_set() {
    let mut raw = RawOptions::new();
    raw.insert("worker-count", "4");
    raw.insert("disker-count", "1");

    assert_eq!(
        ReconfigureOptions::from_raw(&raw).unwrap(),
        ReconfigureOptions {
            workers: Some(4),
            diskers: Some(1),
        }
    );
}

#[test]
fn given_zero_workers_when_parsed_then_error() {
    let mut raw = RawOptions::new();
    raw.insert("worker-count", "0");

    assert!(ReconfigureOptions::from_raw(&raw).is_err());
}
