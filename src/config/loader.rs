// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{Catalog, RawSchedule};
use crate::errors::Result;

/// Load a job schedule from a given path and return the raw `RawSchedule`.
///
/// This only performs JSON deserialization; it does **not** perform semantic
/// validation or environment resolution. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSchedule> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let schedule: RawSchedule = serde_json::from_str(&contents)?;

    Ok(schedule)
}

/// Load a job schedule from path, validate it and resolve `$ENV_VAR` base
/// paths against the process environment.
///
/// This is the recommended entry point for the rest of the application. Any
/// error returned here is a configuration error and aborts the invocation
/// before a single task runs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Catalog> {
    let raw = load_from_path(&path)?;
    let catalog = Catalog::try_from(raw)?;
    Ok(catalog)
}
