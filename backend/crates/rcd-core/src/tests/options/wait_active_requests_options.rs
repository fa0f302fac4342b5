use crate::{RawOptions, WaitActiveRequestsOptions};

#[test]
fn given_path_and_count_when_parsed_then_set() {
    let mut raw = RawOptions::new();
    raw.insert("request-path", "/slow");
    raw.insert("active-requests-count", "3");

    let options = WaitActiveRequestsOptions::from_raw(&raw).unwrap();

    assert_eq!(options.request_path.as_deref(), Some("/slow"));
    assert_eq!(options.active_requests, 3);
}

#[test]
fn given_nothing_when_parsed_then_waits_for_zero_on_all_paths() {
    let options = WaitActiveRequestsOptions::from_raw(&RawOptions::new()).unwrap();

    assert_eq!(options.request_path, None);
    assert_eq!(options.active_requests, 0);
}
