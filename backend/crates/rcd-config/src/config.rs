use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR,
    HealthConfig, LoggingConfig, MemoryCheckerConfig, ProxyConfig, ReadinessConfig, ServerConfig,
};

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub memory_checker: MemoryCheckerConfig,
    pub readiness: ReadinessConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. `RCD_CONFIG_DIR` env var, else `./.rcd/`
    /// 2. Auto-create the config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply `RCD_*` environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        Self::load_from(&Self::config_dir()?)
    }

    /// Load config from a specific directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.dir = config_dir.to_path_buf();
        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: RCD_CONFIG_DIR env var > ./.rcd/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.proxy.validate()?;
        self.readiness.validate()?;
        self.health.validate()?;

        if self.memory_checker.log_file.trim().is_empty() {
            return Err(ConfigError::config(
                "memory_checker.log_file cannot be empty",
            ));
        }

        Ok(())
    }

    /// Resolve a configured path against the config directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.dir.join(path)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.proxy.log_dir)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.proxy.cache_dir)
    }

    pub fn pid_file(&self) -> PathBuf {
        self.resolve(&self.proxy.pid_file)
    }

    pub fn proxy_config_file(&self) -> PathBuf {
        self.resolve(&self.proxy.config_file)
    }

    pub fn main_log(&self) -> PathBuf {
        self.log_dir().join(&self.proxy.main_log)
    }

    pub fn access_log(&self) -> PathBuf {
        self.log_dir().join(&self.proxy.access_log)
    }

    pub fn memory_checker_log(&self) -> PathBuf {
        self.log_dir().join(&self.memory_checker.log_file)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.server.watchdog_secs)
    }

    /// Bind address of the control listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded from {}:", self.dir.display());
        info!(
            "  server: {} (watchdog {}s)",
            self.bind_addr(),
            self.server.watchdog_secs
        );
        info!(
            "  proxy: {} -f {} (pid file {})",
            self.proxy.binary,
            self.proxy_config_file().display(),
            self.pid_file().display()
        );
        info!(
            "  proxy dirs: logs={}, cache={} (initialize: {})",
            self.log_dir().display(),
            self.cache_dir().display(),
            self.proxy.initialize_cache
        );
        info!(
            "  proxy defaults: ports={:?}, kids page={}",
            self.proxy.default_ports, self.proxy.kids_page
        );
        info!(
            "  memory_checker: {} {}",
            self.memory_checker.binary,
            self.memory_checker.args.join(" ")
        );
        info!(
            "  readiness: every {}ms, progress every {} attempts, empty pid grace {}ms",
            self.readiness.poll_interval_ms,
            self.readiness.progress_every,
            self.readiness.empty_pid_grace_ms
        );
        info!("  health: max {} problems per scan", self.health.max_problems);
        info!(
            "  logging: {} (colored: {})",
            self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("RCD_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("RCD_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse("RCD_WATCHDOG_SECS", &mut self.server.watchdog_secs);

        // Proxy
        Self::apply_env_string("RCD_PROXY_BINARY", &mut self.proxy.binary);
        Self::apply_env_string("RCD_PROXY_CONFIG_FILE", &mut self.proxy.config_file);
        Self::apply_env_string("RCD_PROXY_PID_FILE", &mut self.proxy.pid_file);
        Self::apply_env_string("RCD_PROXY_LOG_DIR", &mut self.proxy.log_dir);
        Self::apply_env_string("RCD_PROXY_CACHE_DIR", &mut self.proxy.cache_dir);
        Self::apply_env_bool(
            "RCD_PROXY_INITIALIZE_CACHE",
            &mut self.proxy.initialize_cache,
        );
        Self::apply_env_parse(
            "RCD_PROXY_START_TIMEOUT_SECS",
            &mut self.proxy.start_timeout_secs,
        );

        // Memory checker
        Self::apply_env_string("RCD_MEMORY_CHECKER_BINARY", &mut self.memory_checker.binary);

        // Readiness
        Self::apply_env_parse(
            "RCD_POLL_INTERVAL_MS",
            &mut self.readiness.poll_interval_ms,
        );

        // Logging
        Self::apply_env_parse("RCD_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("RCD_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("RCD_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
