// src/task/mod.rs

//! Turning a catalog entry into a concrete, identifiable command.
//!
//! - [`resolve`] expands `{alias}` templates into a [`CommandLine`].
//! - [`signature`] derives the deterministic [`TaskSignature`] that names the
//!   task's lock and lastrun files.

pub mod resolve;
pub mod signature;

use std::fmt;

pub use resolve::PathResolver;
pub use signature::{signature, TaskSignature};

/// Fully-resolved `interpreter script arg...` argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    parts: Vec<String>,
}

impl CommandLine {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn program(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.parts.get(1..).unwrap_or(&[])
    }

    /// Space-joined form, as logged and stored in lastrun records.
    pub fn joined(&self) -> String {
        self.parts.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
