//! Logging setup for rangepool binaries
//!
//! The library itself only emits `tracing` events. Binaries install a
//! subscriber once with [`init_logging_with_config`], writing either to
//! stderr or to a log file that is rotated aside on every start.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Configuration for the logging subsystem
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub with_timestamp: bool,
    pub with_target: bool,
    pub json_format: bool,
    /// Write here instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamp: true,
            with_target: true,
            json_format: false,
            log_file: None,
        }
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.with_timestamp = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// Initialize logging at `info` on stderr
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. With a log file configured, a
/// non-empty file from an earlier run is first renamed by [`rotate_log_file`].
///
/// # Example
/// ```no_run
/// use rangepool_core::logging::{init_logging_with_config, LogConfig, LogLevel};
///
/// let config = LogConfig::new(LogLevel::Debug).with_target(false);
/// init_logging_with_config(config).expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let (writer, ansi) = match &config.log_file {
        Some(path) => {
            rotate_log_file(path)?;
            (BoxMakeWriter::new(Mutex::new(open_log_file(path)?)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let layer = build_layer(&config, writer, ansi);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

fn build_layer(
    config: &LogConfig,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = fmt::layer()
        .with_target(config.with_target)
        .with_ansi(ansi)
        .with_writer(writer);

    match (config.json_format, config.with_timestamp) {
        (true, true) => base.json().boxed(),
        (true, false) => base.json().without_time().boxed(),
        (false, true) => base.boxed(),
        (false, false) => base.without_time().boxed(),
    }
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let to_err = |source| LoggingError::LogFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_err)?;
    }
    OpenOptions::new().create(true).append(true).open(path).map_err(to_err)
}

/// `<stem>_<date>[.N][.ext]` next to `path`; `n == 0` means no counter
pub fn rotated_name(path: &Path, date: &str, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, date);
    if n > 0 {
        name.push_str(&format!(".{}", n));
    }
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

/// Move a non-empty log file out of the way, dated with today's date.
///
/// Returns where it went, or `None` when there was nothing to rotate.
pub fn rotate_log_file(path: &Path) -> Result<Option<PathBuf>, LoggingError> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => {}
        _ => return Ok(None),
    }

    let date = Local::now().format("%Y-%m-%d").to_string();
    let mut n = 0;
    let mut target = rotated_name(path, &date, n);
    while target.exists() {
        n += 1;
        target = rotated_name(path, &date, n);
    }

    fs::rename(path, &target).map_err(|source| LoggingError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(target))
}
