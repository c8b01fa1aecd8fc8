//! Logging setup: every event goes to stdout and to a timestamped file under the log
//! directory, e.g. `logs/text-reorg_20241017_093015.log`.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "text-reorg";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("{LOG_FILE_PREFIX}_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Installs the global subscriber. Keep the returned guard alive until exit, or
/// buffered file output is lost.
pub fn init_logging(config: &LoggingConfig) -> Result<(WorkerGuard, PathBuf)> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("creating log directory {}", config.log_dir.display()))?;
    let file_name = log_file_name(Local::now());
    let log_file = config.log_dir.join(&file_name);

    let appender = tracing_appender::rolling::never(&config.log_dir, &file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stdout))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok((guard, log_file))
}
