use crate::{CoreError, ShutdownManner};

use std::str::FromStr;

use googletest::assert_that;
use googletest::prelude::{contains_substring, err, pat};

#[test]
fn given_no_manner_when_default_then_most_forceful() {
    assert_eq!(ShutdownManner::default(), ShutdownManner::Immediately);
}

#[test]
fn given_each_manner_when_round_tripped_through_str_then_unchanged() {
    for manner in ShutdownManner::ALL {
        assert_eq!(ShutdownManner::from_str(manner.as_str()).unwrap(), manner);
    }
}

#[test]
fn given_mixed_case_name_when_parsed_then_accepted() {
    assert_eq!(
        ShutdownManner::from_str("Gracefully").unwrap(),
        ShutdownManner::Gracefully
    );
    assert_eq!(
        ShutdownManner::from_str(" URGENTLY ").unwrap(),
        ShutdownManner::Urgently
    );
}

#[test]
fn given_unknown_name_when_parsed_then_error() {
    let result = ShutdownManner::from_str("politely");

    assert_that!(
        result,
        err(pat!(CoreError::InvalidShutdownManner {
            value: contains_substring("politely"),
            ..
        }))
    );
}

#[test]
fn given_manners_when_checking_target_then_only_immediately_hits_group() {
    assert!(!ShutdownManner::Gracefully.targets_process_group());
    assert!(!ShutdownManner::Urgently.targets_process_group());
    assert!(ShutdownManner::Immediately.targets_process_group());
}
