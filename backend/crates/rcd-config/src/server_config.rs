use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_WATCHDOG_SECS,
    MIN_WATCHDOG_SECS,
};

use serde::Deserialize;

/// Where the control listener binds and how long one request may run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Wall-clock limit for handling one connection
    pub watchdog_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            watchdog_secs: DEFAULT_WATCHDOG_SECS,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::server("server.host cannot be empty"));
        }

        if self.watchdog_secs < MIN_WATCHDOG_SECS {
            return Err(ConfigError::server(format!(
                "server.watchdog_secs must be >= {}, got {}",
                MIN_WATCHDOG_SECS, self.watchdog_secs
            )));
        }

        Ok(())
    }
}
