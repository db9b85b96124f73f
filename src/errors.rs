// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only configuration-level failures travel through [`AutoschedError`]; a
//! failing child task is an ordinary [`crate::exec::TaskOutcome`] and never
//! aborts an invocation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoschedError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AutoschedError>;
