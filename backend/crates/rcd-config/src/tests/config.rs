use crate::{
    Config, ConfigError,
    tests::{EnvGuard, config_dir_with},
};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{err, pat};
use log::LevelFilter;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn given_empty_dir_when_load_then_defaults_used() {
    let temp = TempDir::new().unwrap();

    let config = Config::load_from(temp.path()).unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.watchdog_secs, 60);
    assert_eq!(config.proxy.binary, "squid");
    assert_eq!(config.proxy.default_ports, vec![3128]);
    assert!(config.proxy.initialize_cache);
    assert_eq!(config.readiness.poll_interval_ms, 1000);
    assert_eq!(config.readiness.progress_every, 60);
    assert_eq!(config.health.max_problems, 10);
    assert_eq!(*config.logging.level, LevelFilter::Info);
    assert_eq!(config.dir, temp.path());
    config.validate().unwrap();
}

#[test]
#[serial]
fn given_missing_dir_when_load_then_created() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");

    Config::load_from(&nested).unwrap();

    assert!(nested.is_dir());
}

#[test]
#[serial]
fn given_toml_when_load_then_sections_applied() {
    let temp = config_dir_with(
        r#"
[server]
port = 9999
watchdog_secs = 120

[proxy]
binary = "/opt/squid/sbin/squid"
default_ports = [3128, 3129]
kids_page = "events"

[memory_checker]
args = ["--leak-check=summary"]

[logging]
level = "debug"
"#,
    );

    let config = Config::load_from(temp.path()).unwrap();

    assert_eq!(config.server.port, 9999);
    assert_eq!(config.watchdog(), Duration::from_secs(120));
    assert_eq!(config.proxy.binary, "/opt/squid/sbin/squid");
    assert_eq!(config.proxy.default_ports, vec![3128, 3129]);
    assert_eq!(config.proxy.kids_page, "events");
    assert_eq!(config.memory_checker.args, vec!["--leak-check=summary"]);
    assert_eq!(config.memory_checker.binary, "valgrind");
    assert_eq!(*config.logging.level, LevelFilter::Debug);
}

#[test]
#[serial]
fn given_env_overrides_when_load_then_env_wins() {
    let temp = config_dir_with("[server]\nport = 9999\n");
    let _port = EnvGuard::set("RCD_SERVER_PORT", "7777");
    let _binary = EnvGuard::set("RCD_PROXY_BINARY", "/usr/sbin/squid");
    let _init = EnvGuard::set("RCD_PROXY_INITIALIZE_CACHE", "false");
    let _level = EnvGuard::set("RCD_LOG_LEVEL", "warn");

    let config = Config::load_from(temp.path()).unwrap();

    assert_eq!(config.server.port, 7777);
    assert_eq!(config.proxy.binary, "/usr/sbin/squid");
    assert!(!config.proxy.initialize_cache);
    assert_eq!(*config.logging.level, LevelFilter::Warn);
}

#[test]
#[serial]
fn given_unparseable_env_value_when_load_then_ignored() {
    let temp = TempDir::new().unwrap();
    let _port = EnvGuard::set("RCD_SERVER_PORT", "not-a-port");

    let config = Config::load_from(temp.path()).unwrap();

    assert_eq!(config.server.port, 8182);
}

#[test]
#[serial]
fn given_config_dir_env_when_config_dir_then_env_used() {
    let temp = TempDir::new().unwrap();
    let _dir = EnvGuard::set("RCD_CONFIG_DIR", temp.path().to_str().unwrap());

    assert_eq!(Config::config_dir().unwrap(), temp.path());
}

#[test]
#[serial]
fn given_relative_and_absolute_paths_when_resolved_then_joined_against_dir() {
    let temp = config_dir_with("[proxy]\nlog_dir = \"var/logs\"\npid_file = \"/run/squid.pid\"\n");

    let config = Config::load_from(temp.path()).unwrap();

    assert_eq!(config.log_dir(), temp.path().join("var/logs"));
    assert_eq!(config.main_log(), temp.path().join("var/logs/cache.log"));
    assert_eq!(config.memory_checker_log(), temp.path().join("var/logs/valgrind.log"));
    assert_eq!(config.pid_file(), std::path::PathBuf::from("/run/squid.pid"));
}

#[test]
#[serial]
fn given_malformed_toml_when_load_then_toml_error() {
    let temp = config_dir_with("[server\nport = ");

    let result = Config::load_from(temp.path());

    assert_that!(result, err(pat!(ConfigError::Toml { .. })));
}

#[test]
#[serial]
fn given_bad_log_level_in_toml_when_load_then_error() {
    let temp = config_dir_with("[logging]\nlevel = \"loud\"\n");

    assert!(Config::load_from(temp.path()).is_err());
}
