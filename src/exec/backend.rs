// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The scheduler loop talks to an `ExecutorBackend` instead of spawning
//! processes itself. This makes it easy to swap in a fake executor in tests
//! while keeping the production implementation in [`super::process`].

use std::future::Future;
use std::pin::Pin;

use crate::exec::TaskOutcome;
use crate::task::CommandLine;

/// Trait abstracting how an admitted task is executed.
///
/// Production code uses [`super::ProcessExecutor`]; tests can provide their
/// own implementation that doesn't spawn real processes.
pub trait ExecutorBackend: Send {
    /// Run `command` to completion and report how it ended.
    ///
    /// Implementations must not return early: the caller holds the task's
    /// lock for exactly as long as this future is pending.
    fn run<'a>(
        &'a mut self,
        command: &'a CommandLine,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>>;
}
