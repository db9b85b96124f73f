// src/admission/controller.rs

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tracing::warn;

use crate::admission::lastrun::{load_state, LastRunState};
use crate::admission::LockDir;
use crate::task::TaskSignature;

/// Age after which a lock found during admission is reported as probably
/// stale. The lock is still honoured; removal is left to the operator.
pub const STALE_LOCK_AFTER: Duration = Duration::from_secs(30 * 60);

/// Per-tick decision for one candidate task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// A lock file exists for the signature.
    Locked {
        /// When the lock file was last modified, if known.
        since: Option<DateTime<Local>>,
    },
    /// The last success is within the cooldown window.
    CoolingDown {
        last_run: DateTime<Local>,
        remaining: chrono::Duration,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    /// Whether a lock from `since` is older than [`STALE_LOCK_AFTER`] at `now`.
    pub fn lock_looks_stale(&self, now: DateTime<Local>) -> bool {
        match self {
            Admission::Locked { since: Some(since) } => (now - *since)
                .to_std()
                .is_ok_and(|age| age > STALE_LOCK_AFTER),
            _ => false,
        }
    }
}

/// Decides locked / cooling / admitted from the files in the locks directory.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    dir: LockDir,
}

impl AdmissionController {
    pub fn new(dir: LockDir) -> Self {
        Self { dir }
    }

    /// Evaluate admission at `now`.
    ///
    /// - lock file present → [`Admission::Locked`]
    /// - `now - last_success <= min_wait` → [`Admission::CoolingDown`]
    /// - otherwise admitted; an unreadable lastrun record counts as "never ran"
    pub fn decide(
        &self,
        signature: &TaskSignature,
        min_wait: chrono::Duration,
        now: DateTime<Local>,
    ) -> Admission {
        let lock_path = self.dir.lock_path(signature);
        if self.dir.fs().exists(&lock_path) {
            let since = self
                .dir
                .fs()
                .modified(&lock_path)
                .ok()
                .map(|t: SystemTime| DateTime::<Local>::from(t));
            return Admission::Locked { since };
        }

        match load_state(&self.dir, signature) {
            LastRunState::Never => Admission::Admitted,
            LastRunState::Unreadable(reason) => {
                warn!(
                    signature = %signature,
                    reason = %reason,
                    "lastrun record unreadable; treating task as never run"
                );
                Admission::Admitted
            }
            LastRunState::Recorded(record) => {
                let elapsed = now - record.timestamp;
                if elapsed <= min_wait {
                    Admission::CoolingDown {
                        last_run: record.timestamp,
                        // A future timestamp makes `elapsed` negative.
                        remaining: min_wait.checked_sub(&elapsed).unwrap_or(min_wait),
                    }
                } else {
                    Admission::Admitted
                }
            }
        }
    }
}
