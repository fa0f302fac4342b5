use crate::LogLevel;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Log file (relative to the config directory); stdout when absent
    pub file: Option<String>,
    /// Colored stdout output (ignored when logging to a file)
    pub colored: bool,
}
