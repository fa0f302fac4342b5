use crate::{RawOptions, ShutdownManner, StopOptions};

#[test]
fn given_manner_when_parsed_then_set() {
    let mut raw = RawOptions::new();
    raw.insert("Shutdown-Manner", "Urgently");

    assert_eq!(
        StopOptions::from_raw(&raw).unwrap().shutdown_manner,
        Some(ShutdownManner::Urgently)
    );
}

#[test]
fn given_no_manner_when_parsed_then_absent() {
    assert_eq!(StopOptions::from_raw(&RawOptions::new()).unwrap().shutdown_manner, None);
}
