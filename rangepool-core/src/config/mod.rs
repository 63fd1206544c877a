//! Configuration management for rangepool
//!
//! A TOML file or defaults plus `RANGEPOOL_*` environment variables. The
//! resulting [`Config`] is passed explicitly to whatever needs it.

use crate::logging::{LogConfig, LogLevel};
use crate::store::{OverlapPolicy, StoreOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// File name of the log inside `logging.log_dir`
pub const LOG_FILE_NAME: &str = "rangepool.log";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub lists: ListsConfig,
    pub logging: LoggingConfig,
}

/// Range store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pooled SQLite connections
    pub max_connections: u32,

    /// How long a writer waits for a locked database
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,

    /// What counts as "already stored" on insert
    pub overlap_policy: OverlapPolicy,
}

/// Locations of list files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    /// Root holding `whitelists/` and `blocklists/` read by the web server
    pub list_path: PathBuf,

    /// Timestamped backups land below here
    pub backup_path: PathBuf,

    /// Default export target
    pub output_path: PathBuf,

    /// Folder of `ip,hostname` dumps
    pub lookup_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    pub json_format: bool,

    pub with_timestamp: bool,

    pub with_target: bool,

    /// Log to `<log_dir>/rangepool.log` instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let options = StoreOptions::default();
        Self {
            db_path: PathBuf::from("./rangepool.db"),
            max_connections: options.max_connections,
            busy_timeout: options.busy_timeout,
            overlap_policy: options.overlap_policy,
        }
    }
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            list_path: PathBuf::from("./"),
            backup_path: PathBuf::from("./backup"),
            output_path: PathBuf::from("./output"),
            lookup_path: PathBuf::from("./lut"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: false,
            log_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_connections: self.max_connections,
            busy_timeout: self.busy_timeout,
            overlap_policy: self.overlap_policy,
        }
    }
}

impl LoggingConfig {
    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let level: LogLevel = self.level.parse().map_err(ConfigError::InvalidValue)?;
        let mut config = LogConfig::new(level)
            .with_timestamp(self.with_timestamp)
            .with_target(self.with_target)
            .json_format(self.json_format);
        if let Some(dir) = &self.log_dir {
            config = config.log_file(dir.join(LOG_FILE_NAME));
        }
        Ok(config)
    }
}

fn parse_env<T>(key: &str, what: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Defaults overridden by `RANGEPOOL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `RANGEPOOL_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("RANGEPOOL_DB_PATH") {
            self.store.db_path = PathBuf::from(path);
        }
        if let Some(policy) = parse_env("RANGEPOOL_OVERLAP_POLICY", "overlap policy")? {
            self.store.overlap_policy = policy;
        }

        if let Ok(path) = env::var("RANGEPOOL_LIST_PATH") {
            self.lists.list_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("RANGEPOOL_BACKUP_PATH") {
            self.lists.backup_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("RANGEPOOL_OUTPUT_PATH") {
            self.lists.output_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("RANGEPOOL_LOOKUP_PATH") {
            self.lists.lookup_path = PathBuf::from(path);
        }

        if let Ok(level) = env::var("RANGEPOOL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_env("RANGEPOOL_LOG_JSON", "JSON flag")? {
            self.logging.json_format = json;
        }
        if let Ok(dir) = env::var("RANGEPOOL_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Load configuration from a TOML file; missing sections take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.max_connections == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        let paths = [
            ("db_path", &self.store.db_path),
            ("list_path", &self.lists.list_path),
            ("backup_path", &self.lists.backup_path),
            ("output_path", &self.lists.output_path),
            ("lookup_path", &self.lists.lookup_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(format!("{} must not be empty", name)));
            }
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}
