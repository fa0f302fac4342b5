mod config;
mod error;
mod health_config;
mod log_level;
mod logging_config;
mod memory_checker_config;
mod proxy_config;
mod readiness_config;
mod server_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use health_config::HealthConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use memory_checker_config::MemoryCheckerConfig;
pub use proxy_config::ProxyConfig;
pub use readiness_config::ReadinessConfig;
pub use server_config::ServerConfig;

const CONFIG_DIR_ENV: &str = "RCD_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".rcd";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8182;
const DEFAULT_WATCHDOG_SECS: u64 = 60;
const MIN_WATCHDOG_SECS: u64 = 1;

const DEFAULT_PROXY_BINARY: &str = "squid";
const DEFAULT_PROXY_CONFIG_FILE: &str = "squid.conf";
const DEFAULT_PID_FILE: &str = "squid.pid";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_CACHE_DIR: &str = "cache";
const DEFAULT_MAIN_LOG: &str = "cache.log";
const DEFAULT_ACCESS_LOG: &str = "access.log";
const DEFAULT_LISTENING_PORT: u16 = 3128;
const DEFAULT_KIDS_PAGE: &str = "info";

const DEFAULT_MEMORY_CHECKER_BINARY: &str = "valgrind";
const DEFAULT_MEMORY_CHECKER_LOG: &str = "valgrind.log";
const DEFAULT_MEMORY_CHECKER_ARGS: &[&str] = &[
    "--leak-check=full",
    "--show-leak-kinds=definite,indirect",
    "--trace-children=yes",
    "--num-callers=50",
];

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_PROGRESS_EVERY: u32 = 60;
const DEFAULT_EMPTY_PID_GRACE_MS: u64 = 1000;
const MIN_POLL_INTERVAL_MS: u64 = 10;

const DEFAULT_MAX_PROBLEMS: usize = 10;
const MAX_MAX_PROBLEMS: usize = 1000;

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
