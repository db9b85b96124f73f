// src/config/env.rs

//! Directories supplied through the environment.

use std::path::PathBuf;

use crate::errors::{AutoschedError, Result};

/// Holds `.lock` / `.lastrun` files; required by the scheduler.
pub const LOCKS_ENV: &str = "AUTOSCHED_LOCKS";
/// Where child tasks write their own logs; swept by default.
pub const TASK_LOGS_ENV: &str = "AUTOSCHED_TASK_LOGS";
/// Where the scheduler and sweeper write their log files; swept by default.
pub const UTIL_LOGS_ENV: &str = "AUTOSCHED_UTIL_LOGS";

/// The three well-known directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directories {
    pub locks: Option<PathBuf>,
    pub task_logs: Option<PathBuf>,
    pub util_logs: Option<PathBuf>,
}

impl Directories {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the directories through `env`; empty values count as unset.
    pub fn from_lookup<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = |name: &str| {
            env(name)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            locks: dir(LOCKS_ENV),
            task_logs: dir(TASK_LOGS_ENV),
            util_logs: dir(UTIL_LOGS_ENV),
        }
    }

    /// The locks directory, preferring an explicit override.
    pub fn require_locks(&self, override_dir: Option<PathBuf>) -> Result<PathBuf> {
        override_dir.or_else(|| self.locks.clone()).ok_or_else(|| {
            AutoschedError::ConfigError(format!(
                "locks directory not configured: set {} or pass --locks-dir",
                LOCKS_ENV
            ))
        })
    }

    /// Configured directories in sweep order (locks, task logs, util logs),
    /// without duplicates.
    pub fn sweep_targets(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        for dir in [&self.locks, &self.task_logs, &self.util_logs]
            .into_iter()
            .flatten()
        {
            if !out.contains(dir) {
                out.push(dir.clone());
            }
        }
        out
    }
}
