// src/retention/mod.rs

//! Log and artifact retention.
//!
//! The sweeper runs as its own invocation (`autosched-sweep`) and never
//! coordinates with a running scheduler. It only ever touches files that
//! match the policy's include globs, so `.lock` files are safe from it.
//!
//! - [`policy`]: thresholds, caps and include/exclude globs.
//! - [`archive`]: zip bundle naming and construction.
//! - [`sweeper`]: the per-directory cap / rotate / trim / purge pass.

pub mod archive;
pub mod policy;
pub mod sweeper;

/// Subdirectory holding rotated archives, both in swept directories and in
/// the locks directory.
pub const ARCHIVE_DIR: &str = "archive";

pub use policy::{FileMatcher, RetentionPolicy};
pub use sweeper::{RetentionSweeper, SweepReport};
