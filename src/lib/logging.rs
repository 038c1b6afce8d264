use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_PREFIX: &str = "music-sorter.log";

/// Map a configured level name to a filter; unknown names fall back to INFO
pub fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "error" => LevelFilter::ERROR,
        "warn" => LevelFilter::WARN,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    }
}

/// Install the global subscriber: console output plus a daily log file in
/// `logging.directory`. Keep the returned guard alive until exit so buffered
/// lines reach the file.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<WorkerGuard> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        level_filter(&config.level)
    };

    fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "Failed to create log directory '{}'",
            config.directory.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(&config.directory, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(level)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
