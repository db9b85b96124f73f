// src/admission/lock.rs

//! Scoped lock markers.
//!
//! A lock is a plain file at `{locks_dir}/{signature}.lock`. Acquisition is a
//! single `create_new` call, so two schedulers racing on the same signature
//! cannot both win. The guard exists as soon as the file does and removes it
//! when dropped, which covers every local exit path including panics and a
//! failed payload write. A process that is killed keeps its
//! lock on disk; nothing here clears stale locks.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, warn};

use crate::admission::LockDir;
use crate::fs::FileSystem;
use crate::task::{CommandLine, TaskSignature};

#[derive(Error, Debug)]
pub enum LockError {
    /// Another holder created the lock first.
    #[error("lock already held: {0:?}")]
    Held(PathBuf),

    #[error("creating lock {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The lock was created but its payload could not be written. The file
    /// has been removed again.
    #[error("writing lock {path:?}: {reason}")]
    Payload { path: PathBuf, reason: String },
}

/// Held lock marker; released on drop.
#[derive(Debug)]
pub struct LockGuard {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    /// Atomically create the lock file for `signature`.
    ///
    /// The file carries a diagnostic payload naming the automation id and the
    /// resolved command.
    pub fn acquire(
        dir: &LockDir,
        signature: &TaskSignature,
        automation_id: &str,
        command: &CommandLine,
    ) -> std::result::Result<Self, LockError> {
        let path = dir.lock_path(signature);
        let payload = format!(
            "Task locked for Automation ID: {}\nCommand: {}\n",
            automation_id, command
        );

        match dir.fs().create_new(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::Held(path));
            }
            Err(source) => return Err(LockError::Io { path, source }),
        }

        // From here on the file is ours; dropping the guard removes it.
        let guard = Self {
            fs: Arc::clone(dir.fs()),
            path,
            released: false,
        };
        if let Err(e) = guard.fs.write(&guard.path, payload.as_bytes()) {
            return Err(LockError::Payload {
                path: guard.path.clone(),
                reason: format!("{e:#}"),
            });
        }
        debug!(path = ?guard.path, "lock acquired");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the lock file now, reporting failures to the caller.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        remove_if_present(self.fs.as_ref(), &self.path)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_if_present(self.fs.as_ref(), &self.path) {
            warn!(path = ?self.path, error = %e, "failed to remove lock file");
        }
    }
}

fn remove_if_present(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.exists(path) {
        fs.remove_file(path)?;
        debug!(path = ?path, "lock released");
    }
    Ok(())
}
