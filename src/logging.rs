//! Structured logging and tracing for Thermolog
//!
//! Logging is configured from an explicit [`LoggingConfig`] built by the
//! binary from its command line. Output goes either to stderr or to a log
//! file that is truncated at the start of every run.

mod level;
mod structured;

pub use level::{level_name, parse_log_level};
pub use structured::{LogContext, StructuredLogger, get_logger};

use crate::error::{PollerError, Result};
use once_cell::sync::OnceCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{Level, info};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Keep the non-blocking worker guard alive for the entire process lifetime
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (DEBUG, INFO, WARNING, ERROR)
    pub level: String,

    /// Optional log file, overwritten on every run
    pub file: Option<PathBuf>,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: None,
            json_format: false,
        }
    }
}

/// Initialize logging system based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let level = parse_log_level(&config.level)?;
            let filter = build_env_filter(level);

            match &config.file {
                Some(path) => init_file_logging(path, filter, level, config.json_format)?,
                None => init_console_logging(filter, level, config.json_format),
            }
            Ok(())
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(PollerError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("thermolog={},reqwest=warn,hyper=warn", level.as_str().to_lowercase()).into()
    })
}

fn init_console_logging(filter: EnvFilter, level: Level, json_format: bool) {
    let console_layer = {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false);
        if json_format {
            layer
                .json()
                .with_filter(LevelFilter::from_level(level))
                .boxed()
        } else {
            layer.with_filter(LevelFilter::from_level(level)).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();

    info!("Logging initialized - level: {}, console", level_name(level));
}

fn init_file_logging(
    path: &Path,
    filter: EnvFilter,
    level: Level,
    json_format: bool,
) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    // Truncate: the log file only ever describes the latest run
    let file = File::create(path).map_err(|e| {
        PollerError::io(format!(
            "Failed to create log file {}: {}",
            path.display(),
            e
        ))
    })?;

    let (writer, guard) = non_blocking(file);
    let _ = LOG_GUARD.set(guard);

    let file_layer = {
        let base = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false);
        if json_format {
            base.json()
                .with_filter(LevelFilter::from_level(level))
                .boxed()
        } else {
            base.with_filter(LevelFilter::from_level(level)).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    info!(
        "Logging initialized - level: {}, file: {}",
        level_name(level),
        path.display()
    );
    Ok(())
}
