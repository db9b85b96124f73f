// src/engine/mod.rs

//! One scheduler invocation.
//!
//! [`SchedulerLoop`] walks the catalog in order and, for each active task,
//! resolves its command, asks the admission controller, and runs it under a
//! lock through an [`crate::exec::ExecutorBackend`]. Tasks never run in
//! parallel. The result is a [`RunReport`] with one entry per evaluated task.

pub mod report;
pub mod scheduler;

pub use report::{Disposition, RunReport, TaskReport};
pub use scheduler::{SchedulerLoop, SchedulerOptions};
