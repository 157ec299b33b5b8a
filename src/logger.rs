//! Logging bootstrap and in-memory log buffer.
//!
//! `init_logging` installs a `fern` dispatch for the `log` facade exactly once per
//! process. Every record lands in a bounded in-memory [`Logger`] buffer; when file
//! logging is enabled it is also appended to `<cache>/backbenchers/backbenchers.log`.

use anyhow::{Context, Result};
use chrono::Utc;
use log::LevelFilter;
use once_cell::sync::{Lazy, OnceCell};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "backbenchers.log";
const MAX_BUFFERED_LINES: usize = 500;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static BUFFER: Lazy<Logger> = Lazy::new(|| Logger::with_capacity(MAX_BUFFERED_LINES));

struct LoggingState {
    level: LevelFilter,
    log_file: Option<PathBuf>,
}

/// Shared, bounded log buffer that can be used across the application
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<Vec<String>>>,
    capacity: usize,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFERED_LINES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
        }
    }

    /// Add a log entry, dropping the oldest once the buffer is full
    pub fn log(&self, message: String) {
        let timestamp = Utc::now().format("%H:%M:%S%.3f").to_string();
        self.push(format!("[{}] {}", timestamp, message));
    }

    fn push(&self, line: String) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.push(line);
            if logs.len() > self.capacity {
                let overflow = logs.len() - self.capacity;
                logs.drain(..overflow);
            }
        }
    }

    /// Get all logs, newest first
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.logs.lock().map(|logs| logs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide buffer fed by the `log` macros once logging is initialized.
pub fn buffer() -> &'static Logger {
    &BUFFER
}

/// Map a configured level name to a filter. `warning` is accepted for `warn`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Default location of the log file.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("backbenchers").join(LOG_FILE_NAME))
}

/// Install the global logger.
///
/// Repeated calls with the same settings are no-ops; a second call asking for a
/// different level or log file is rejected.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level)
        .ok_or_else(|| anyhow::anyhow!("Unsupported log level '{}'", config.level))?;
    let log_file = if config.enabled { default_log_path() } else { None };

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState> {
        let mut dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {:<5} [{}] {}",
                    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .chain(fern::Output::call(|record| {
                buffer().push(record.args().to_string());
            }));

        if let Some(path) = &log_file {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            dispatch = dispatch.chain(
                fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?,
            );
        }

        dispatch.apply().context("A global logger is already installed")?;

        log::info!(
            "logging started: level={} file={}",
            level,
            log_file
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(LoggingState {
            level,
            log_file: log_file.clone(),
        })
    })?;

    if state.level != level || state.log_file != log_file {
        anyhow::bail!(
            "Logging already initialized with level '{}'; refusing to reconfigure",
            state.level
        );
    }

    Ok(())
}
