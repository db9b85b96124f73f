// src/logging.rs

//! Logging setup for `autosched` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `AUTOSCHED_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs always go to STDERR. When a utility-log directory is configured, the
//! same events are also appended to an hourly-rolling file named
//! `{host}_{batch}_{program}.{YYYY-MM-DD-HH}.log` (UTC hour). The retention
//! sweeper rotates these like any other `*.log` file, except the one for the
//! current hour, which may still be open.
//!
//! There is no global logger registry: each invocation opens one
//! [`session_span`] carrying host, batch and program, and the scheduler nests
//! a span per task inside it.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_LEVEL_ENV: &str = "AUTOSCHED_LOG";

/// Extension of the rolling log files.
pub const LOG_FILE_SUFFIX: &str = "log";

/// Initialise the global logging subscriber.
///
/// Safe to call once at startup. The returned guard must be held until exit
/// so buffered file output is flushed.
pub fn init_logging(
    cli_level: Option<LogLevel>,
    file_dir: Option<&Path>,
    file_prefix: &str,
) -> Result<Option<WorkerGuard>> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match file_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {:?}", dir))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::HOURLY)
                .filename_prefix(file_prefix)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(dir)
                .with_context(|| format!("opening rolling log file in {:?}", dir))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}

/// File-name ending of the hourly log that is being written at `now`.
pub fn open_log_suffix(now: SystemTime) -> String {
    format!(
        ".{}.{}",
        DateTime::<Utc>::from(now).format("%Y-%m-%d-%H"),
        LOG_FILE_SUFFIX
    )
}

/// Name of the machine running this invocation.
pub fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}

/// Log-file prefix for one program within one batch.
pub fn file_prefix(batch: &str, program: &str) -> String {
    format!("{}_{}_{}", host_name(), batch, program)
}

/// Root span for one invocation of a binary.
pub fn session_span(batch: &str, program: &str) -> Span {
    tracing::info_span!("session", host = %host_name(), batch, program)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
