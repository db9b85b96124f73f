// src/admission/mod.rs

//! On-disk admission state for the scheduler.
//!
//! Everything here is keyed by [`TaskSignature`] inside one locks directory:
//!
//! - `{locks_dir}/{signature}.lock` marks a running task ([`lock`]).
//! - `{locks_dir}/{signature}.lastrun` holds the last successful command and
//!   its timestamp ([`lastrun`]).
//! - [`controller`] reads both to decide locked / cooling / admitted.
//!
//! All decisions are derived from these files only, so two scheduler
//! processes sharing the directory see the same state.

pub mod controller;
pub mod lastrun;
pub mod lock;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::fs::{FileSystem, RealFileSystem};
use crate::retention::ARCHIVE_DIR;
use crate::task::TaskSignature;

pub use controller::{Admission, AdmissionController, STALE_LOCK_AFTER};
pub use lastrun::{LastRunRecord, LastRunState, RunRecorder};
pub use lock::{LockError, LockGuard};

/// The locks directory plus the filesystem used to reach it.
#[derive(Debug, Clone)]
pub struct LockDir {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl LockDir {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// Locks directory on the real filesystem.
    pub fn on_disk(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(RealFileSystem), root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn lock_path(&self, signature: &TaskSignature) -> PathBuf {
        self.root.join(signature.lock_file_name())
    }

    pub fn lastrun_path(&self, signature: &TaskSignature) -> PathBuf {
        self.root.join(signature.lastrun_file_name())
    }

    /// Create the directory and its `archive/` subdirectory if missing.
    pub fn ensure_layout(&self) -> Result<()> {
        self.fs.create_dir_all(&self.root.join(ARCHIVE_DIR))
    }

    /// Names of lock files currently present.
    pub fn lock_files(&self) -> Result<Vec<PathBuf>> {
        let mut locks: Vec<PathBuf> = self
            .fs
            .read_dir(&self.root)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "lock"))
            .filter(|p| self.fs.is_file(p))
            .collect();
        locks.sort();
        Ok(locks)
    }
}
