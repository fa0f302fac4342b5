use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_ACCESS_LOG, DEFAULT_CACHE_DIR, DEFAULT_KIDS_PAGE,
    DEFAULT_LISTENING_PORT, DEFAULT_LOG_DIR, DEFAULT_MAIN_LOG, DEFAULT_PID_FILE,
    DEFAULT_PROXY_BINARY, DEFAULT_PROXY_CONFIG_FILE,
};

use serde::Deserialize;

/// The managed proxy: how to launch it and where its state lives.
///
/// Paths are relative to the config directory unless absolute. `main_log`
/// and `access_log` are file names inside `log_dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub binary: String,
    pub config_file: String,
    pub pid_file: String,
    pub log_dir: String,
    pub cache_dir: String,
    pub main_log: String,
    pub access_log: String,
    /// Appended after `-f <config_file>` on every launch
    pub extra_args: Vec<String>,
    /// Run `<binary> -z` after rotating the cache directory
    pub initialize_cache: bool,
    /// Listening ports assumed when a reset does not name any
    pub default_ports: Vec<u16>,
    /// Diagnostic page whose per-kid sections prove kid registration
    pub kids_page: String,
    /// Bound on each start readiness goal (0 = wait until the watchdog fires)
    pub start_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            binary: String::from(DEFAULT_PROXY_BINARY),
            config_file: String::from(DEFAULT_PROXY_CONFIG_FILE),
            pid_file: String::from(DEFAULT_PID_FILE),
            log_dir: String::from(DEFAULT_LOG_DIR),
            cache_dir: String::from(DEFAULT_CACHE_DIR),
            main_log: String::from(DEFAULT_MAIN_LOG),
            access_log: String::from(DEFAULT_ACCESS_LOG),
            extra_args: Vec::new(),
            initialize_cache: true,
            default_ports: vec![DEFAULT_LISTENING_PORT],
            kids_page: String::from(DEFAULT_KIDS_PAGE),
            start_timeout_secs: 0,
        }
    }
}

impl ProxyConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (name, value) in [
            ("proxy.binary", &self.binary),
            ("proxy.config_file", &self.config_file),
            ("proxy.pid_file", &self.pid_file),
            ("proxy.log_dir", &self.log_dir),
            ("proxy.cache_dir", &self.cache_dir),
            ("proxy.main_log", &self.main_log),
            ("proxy.access_log", &self.access_log),
            ("proxy.kids_page", &self.kids_page),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::proxy(format!("{name} cannot be empty")));
            }
        }

        if self.log_dir == self.cache_dir {
            return Err(ConfigError::proxy(
                "proxy.log_dir and proxy.cache_dir must differ (both are rotated)",
            ));
        }

        if self.default_ports.is_empty() || self.default_ports.contains(&0) {
            return Err(ConfigError::proxy(
                "proxy.default_ports must list at least one non-zero port",
            ));
        }

        Ok(())
    }
}
