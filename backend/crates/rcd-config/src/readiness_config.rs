use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_EMPTY_PID_GRACE_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_PROGRESS_EVERY, MIN_POLL_INTERVAL_MS,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Delay between predicate evaluations
    pub poll_interval_ms: u64,
    /// Log a "still waiting" line every N attempts
    pub progress_every: u32,
    /// How long an empty PID file is given to fill in
    pub empty_pid_grace_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            empty_pid_grace_ms: DEFAULT_EMPTY_PID_GRACE_MS,
        }
    }
}

impl ReadinessConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::readiness(format!(
                "readiness.poll_interval_ms must be >= {}, got {}",
                MIN_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.progress_every == 0 {
            return Err(ConfigError::readiness(
                "readiness.progress_every must be > 0",
            ));
        }

        Ok(())
    }
}
