use crate::{Config, ConfigError};

use googletest::assert_that;
use googletest::prelude::{contains_substring, err, pat};

fn assert_invalid(config: &Config, needle: &str) {
    assert_that!(
        config.validate(),
        err(pat!(ConfigError::Generic {
            message: contains_substring(needle),
            ..
        }))
    );
}

#[test]
fn given_zero_watchdog_when_validate_then_error() {
    let mut config = Config::default();
    config.server.watchdog_secs = 0;

    assert_invalid(&config, "server.watchdog_secs");
}

#[test]
fn given_same_log_and_cache_dir_when_validate_then_error() {
    let mut config = Config::default();
    config.proxy.cache_dir = config.proxy.log_dir.clone();

    assert_invalid(&config, "must differ");
}

#[test]
fn given_empty_binary_when_validate_then_error() {
    let mut config = Config::default();
    config.proxy.binary = String::from("  ");

    assert_invalid(&config, "proxy.binary");
}

#[test]
fn given_no_default_ports_when_validate_then_error() {
    let mut config = Config::default();
    config.proxy.default_ports.clear();

    assert_invalid(&config, "proxy.default_ports");
}

#[test]
fn given_tiny_poll_interval_when_validate_then_error() {
    let mut config = Config::default();
    config.readiness.poll_interval_ms = 1;

    assert_invalid(&config, "readiness.poll_interval_ms");
}

#[test]
fn given_zero_progress_every_when_validate_then_error() {
    let mut config = Config::default();
    config.readiness.progress_every = 0;

    assert_invalid(&config, "readiness.progress_every");
}

#[test]
fn given_zero_max_problems_when_validate_then_error() {
    let mut config = Config::default();
    config.health.max_problems = 0;

    assert_invalid(&config, "health.max_problems");
}
