// src/config/mod.rs

//! Configuration loading and validation for autosched.
//!
//! Responsibilities:
//! - Define the JSON-backed job schedule model (`model.rs`).
//! - Load a schedule file from disk (`loader.rs`).
//! - Validate task fields and resolve `$ENV_VAR` base paths (`validate.rs`).
//! - Read the well-known directories from the environment (`env.rs`).

pub mod env;
pub mod loader;
pub mod model;
pub mod validate;

pub use env::{Directories, LOCKS_ENV, TASK_LOGS_ENV, UTIL_LOGS_ENV};
pub use loader::{load_and_validate, load_from_path};
pub use model::{
    BasePaths, Catalog, ORPHAN_TASK, RawArguments, RawSchedule, RawTask, TaskDefinition,
    TaskIndex,
};
pub use validate::validate_schedule;
