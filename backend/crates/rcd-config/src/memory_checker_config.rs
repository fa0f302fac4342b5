use crate::{DEFAULT_MEMORY_CHECKER_ARGS, DEFAULT_MEMORY_CHECKER_BINARY, DEFAULT_MEMORY_CHECKER_LOG};

use serde::Deserialize;

/// Wrapper used when a reset asks for memory checking.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryCheckerConfig {
    pub binary: String,
    /// File name inside the proxy log directory
    pub log_file: String,
    pub args: Vec<String>,
}

impl Default for MemoryCheckerConfig {
    fn default() -> Self {
        Self {
            binary: String::from(DEFAULT_MEMORY_CHECKER_BINARY),
            log_file: String::from(DEFAULT_MEMORY_CHECKER_LOG),
            args: DEFAULT_MEMORY_CHECKER_ARGS
                .iter()
                .map(|arg| arg.to_string())
                .collect(),
        }
    }
}
