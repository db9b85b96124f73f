// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Two binaries share this module: `autosched` (the scheduler) and
//! `autosched-sweep` (the retention sweeper). The scheduler keeps the
//! underscore flag spellings (`--max_tasks=100`) that existing timer units
//! already pass.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::TimeUnit;

/// Command-line arguments for `autosched`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autosched",
    version,
    about = "Run the active tasks of a job schedule under lock and cooldown control.",
    long_about = None
)]
pub struct SchedulerArgs {
    /// Path to the job schedule (JSON).
    #[arg(value_name = "JOB_SCHEDULE_PATH")]
    pub job_schedule_path: PathBuf,

    /// Maximum number of tasks to attempt in this invocation.
    #[arg(long = "max_tasks", value_name = "N", default_value_t = 100)]
    pub max_tasks: usize,

    /// Pause between two attempted tasks.
    #[arg(long = "interval_wait", value_name = "AMOUNT", default_value_t = 10.0)]
    pub interval_wait: f64,

    /// Unit for `--interval_wait`.
    #[arg(
        long = "interval_wait_units",
        value_enum,
        value_name = "UNIT",
        default_value = "seconds"
    )]
    pub interval_wait_units: TimeUnit,

    /// Directory holding `.lock` / `.lastrun` files.
    ///
    /// Overrides the `AUTOSCHED_LOCKS` environment variable.
    #[arg(long, value_name = "PATH")]
    pub locks_dir: Option<PathBuf>,

    /// Evaluate admission for every active task but execute nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUTOSCHED_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Command-line arguments for `autosched-sweep`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autosched-sweep",
    version,
    about = "Rotate, archive and purge aged log artifacts.",
    long_about = None
)]
pub struct SweepArgs {
    /// Directories to sweep.
    ///
    /// Default: the locks, task-log and utility-log directories from the
    /// environment.
    #[arg(value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    /// Retention policy file (TOML). Flags below override its values.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Archive live files older than this.
    #[arg(long, value_name = "AMOUNT")]
    pub rotate_after: Option<f64>,

    #[arg(long, value_enum, value_name = "UNIT")]
    pub rotate_unit: Option<TimeUnit>,

    /// Delete archives older than this.
    #[arg(long, value_name = "AMOUNT")]
    pub purge_after: Option<f64>,

    #[arg(long, value_enum, value_name = "UNIT")]
    pub purge_unit: Option<TimeUnit>,

    /// Maximum live files kept per directory before the oldest are deleted.
    #[arg(long, value_name = "N")]
    pub max_live_files: Option<usize>,

    /// Maximum archives kept per directory.
    #[arg(long, value_name = "N")]
    pub max_archive_files: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `SchedulerArgs::parse()`.
pub fn parse() -> SchedulerArgs {
    SchedulerArgs::parse()
}

pub fn parse_sweep() -> SweepArgs {
    SweepArgs::parse()
}
