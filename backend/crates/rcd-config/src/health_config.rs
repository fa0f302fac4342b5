use crate::{ConfigError, ConfigErrorResult, DEFAULT_MAX_PROBLEMS, MAX_MAX_PROBLEMS};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Problems reported per log scan before the rest are summarized
    pub max_problems: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_problems: DEFAULT_MAX_PROBLEMS,
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_problems == 0 || self.max_problems > MAX_MAX_PROBLEMS {
            return Err(ConfigError::config(format!(
                "health.max_problems must be 1-{}, got {}",
                MAX_MAX_PROBLEMS, self.max_problems
            )));
        }
        Ok(())
    }
}
