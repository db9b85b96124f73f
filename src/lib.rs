// src/lib.rs

pub mod admission;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod retention;
pub mod task;
pub mod types;

use std::time::SystemTime;

use anyhow::Result;
use tracing::info;

use crate::admission::LockDir;
use crate::cli::{SchedulerArgs, SweepArgs};
use crate::config::{load_and_validate, Directories, LOCKS_ENV, TASK_LOGS_ENV, UTIL_LOGS_ENV};
use crate::engine::{RunReport, SchedulerLoop, SchedulerOptions};
use crate::errors::AutoschedError;
use crate::exec::ProcessExecutor;
use crate::fs::RealFileSystem;
use crate::retention::{RetentionPolicy, RetentionSweeper, SweepReport};

/// Entry point used by the `autosched` binary.
///
/// This wires together:
/// - locks directory (flag or environment)
/// - schedule loading and validation
/// - the scheduler loop with the real process executor
///
/// Every error returned here happened before any task ran.
pub async fn run_scheduler(args: SchedulerArgs, dirs: &Directories) -> Result<RunReport> {
    let locks_dir = dirs.require_locks(args.locks_dir.clone())?;
    let catalog = load_and_validate(&args.job_schedule_path)?;
    info!(
        schedule = %args.job_schedule_path.display(),
        tasks = catalog.len(),
        "job schedule loaded"
    );

    let options = SchedulerOptions {
        max_tasks: args.max_tasks,
        interval_wait: args.interval_wait_units.duration(args.interval_wait),
        dry_run: args.dry_run,
    };

    let mut scheduler =
        SchedulerLoop::new(LockDir::on_disk(locks_dir), ProcessExecutor::new(), options);
    let report = scheduler.run(&catalog).await?;
    Ok(report)
}

/// Entry point used by the `autosched-sweep` binary.
///
/// Policy comes from `--config` (or defaults) with flags layered on top.
/// Without explicit directories, the configured environment directories are
/// swept.
pub fn run_sweep(args: SweepArgs, dirs: &Directories) -> Result<Vec<SweepReport>> {
    let mut policy = match &args.config {
        Some(path) => RetentionPolicy::load(&RealFileSystem, path)?,
        None => RetentionPolicy::default(),
    };
    policy.apply_overrides(&args);

    let directories = if args.directories.is_empty() {
        dirs.sweep_targets()
    } else {
        args.directories.clone()
    };
    if directories.is_empty() {
        return Err(AutoschedError::ConfigError(format!(
            "nothing to sweep: pass directories or set {LOCKS_ENV}, {TASK_LOGS_ENV} or {UTIL_LOGS_ENV}"
        ))
        .into());
    }

    let sweeper = RetentionSweeper::on_disk(policy)?;
    info!(
        directories = ?directories,
        policy = ?sweeper.policy(),
        "retention sweep started"
    );

    let reports = sweeper.sweep(&directories, SystemTime::now())?;
    for report in &reports {
        info!(
            dir = %report.directory.display(),
            removed_over_cap = report.removed_over_cap.len(),
            rotated = report.rotated.len(),
            archives_trimmed = report.archives_trimmed.len(),
            archives_purged = report.archives_purged.len(),
            "directory swept"
        );
    }
    Ok(reports)
}
