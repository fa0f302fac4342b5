use crate::{CoreError, RawOptions};

use googletest::assert_that;
use googletest::prelude::{contains_substring, err, pat};

#[test]
fn given_mixed_case_name_when_inserted_then_lookup_is_case_insensitive() {
    let mut raw = RawOptions::new();
    raw.insert("Worker-Count", " 2 ");

    assert_eq!(raw.get("worker-count"), Some("2"));
    assert_eq!(raw.get("WORKER-COUNT"), Some("2"));
    assert_eq!(raw.names().collect::<Vec<_>>(), vec!["worker-count"]);
}

#[test]
fn given_count_below_minimum_when_parsed_then_error() {
    let mut raw = RawOptions::new();
    raw.insert("worker-count", "0");

    assert_that!(
        raw.count("worker-count", 1..=128),
        err(pat!(CoreError::InvalidOption {
            message: contains_substring("at least 1"),
            ..
        }))
    );
}

#[test]
fn given_non_numeric_count_when_parsed_then_error() {
    let mut raw = RawOptions::new();
    raw.insert("disker-count", "many");

    assert!(raw.count("disker-count", 0..=128).is_err());
}

#[test]
fn given_port_list_when_parsed_then_duplicates_dropped() {
    let mut raw = RawOptions::new();
    raw.insert("listening-ports", "3128, 3129 3128");

    assert_eq!(
        raw.ports("listening-ports").unwrap(),
        Some(vec![3128, 3129])
    );
}

#[test]
fn given_port_zero_or_garbage_when_parsed_then_error() {
    let mut raw = RawOptions::new();
    raw.insert("listening-ports", "0");
    assert!(raw.ports("listening-ports").is_err());

    raw.insert("listening-ports", "70000");
    assert!(raw.ports("listening-ports").is_err());

    raw.insert("listening-ports", " , ");
    assert!(raw.ports("listening-ports").is_err());
}

#[test]
fn given_boolean_words_when_parsed_then_mapped() {
    let mut raw = RawOptions::new();
    for (word, expected) in [("yes", true), ("On", true), ("1", true), ("no", false), ("FALSE", false)] {
        raw.insert("memory-checker-use", word);
        assert_eq!(raw.flag("memory-checker-use").unwrap(), Some(expected));
    }

    raw.insert("memory-checker-use", "maybe");
    assert!(raw.flag("memory-checker-use").is_err());
}

#[test]
fn given_missing_option_when_parsed_then_none() {
    let raw = RawOptions::new();

    assert_eq!(raw.count("worker-count", 1..=128).unwrap(), None);
    assert_eq!(raw.flag("memory-checker-use").unwrap(), None);
    assert_eq!(raw.ports("listening-ports").unwrap(), None);
}

#[test]
fn given_count_above_maximum_when_parsed_then_error() {
    let mut raw = RawOptions::new();
    raw.insert("disker-count", "129");

    assert_that!(
        raw.count("disker-count", 0..=128),
        err(pat!(CoreError::InvalidOption {
            message: contains_substring("at most 128"),
            ..
        }))
    );
    assert_eq!(raw.count("disker-count", 0..=129).unwrap(), Some(129));
}
