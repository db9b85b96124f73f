// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the resolved command of
//! an admitted task, using `tokio::process::Command`, and reporting back a
//! [`TaskOutcome`].
//!
//! - [`backend`] provides the `ExecutorBackend` trait the scheduler loop
//!   depends on, so tests can replace it with a fake implementation.
//! - [`process`] is the real implementation.

pub mod backend;
pub mod process;

pub use backend::ExecutorBackend;
pub use process::{run_command, ProcessExecutor};

/// How one attempted task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The child exited with status 0.
    Success,
    /// The child exited non-zero; `-1` when it was killed by a signal.
    Failed(i32),
    /// The task could not be run at all (spawn failure, lock I/O, ...).
    Error(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}
