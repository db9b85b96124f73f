// src/retention/sweeper.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use chrono::{DateTime, Local};
use tracing::{debug, info, info_span};

use crate::errors::{AutoschedError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logging::open_log_suffix;
use crate::retention::archive::{build_archive, unique_archive_path};
use crate::retention::policy::{FileMatcher, RetentionPolicy};
use crate::retention::ARCHIVE_DIR;

/// What one sweep did to one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub directory: PathBuf,
    /// Oldest live files deleted because the directory was over its cap.
    pub removed_over_cap: Vec<PathBuf>,
    /// Live files moved into `archive`.
    pub rotated: Vec<PathBuf>,
    pub archive: Option<PathBuf>,
    pub archives_trimmed: Vec<PathBuf>,
    pub archives_purged: Vec<PathBuf>,
}

impl SweepReport {
    fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.removed_over_cap.is_empty()
            && self.rotated.is_empty()
            && self.archives_trimmed.is_empty()
            && self.archives_purged.is_empty()
    }
}

/// Rotates, archives and purges aged files under a [`RetentionPolicy`].
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    fs: Arc<dyn FileSystem>,
    policy: RetentionPolicy,
    matcher: FileMatcher,
}

impl RetentionSweeper {
    pub fn new(fs: Arc<dyn FileSystem>, policy: RetentionPolicy) -> Result<Self> {
        policy.validate()?;
        let matcher = policy.matcher()?;
        Ok(Self {
            fs,
            policy,
            matcher,
        })
    }

    pub fn on_disk(policy: RetentionPolicy) -> Result<Self> {
        Self::new(Arc::new(RealFileSystem), policy)
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Sweep every directory in order.
    ///
    /// All directories are checked up front; a missing one fails the whole
    /// call before anything is touched.
    pub fn sweep(&self, directories: &[PathBuf], now: SystemTime) -> Result<Vec<SweepReport>> {
        for dir in directories {
            if !self.fs.is_dir(dir) {
                return Err(AutoschedError::ConfigError(format!(
                    "sweep directory {:?} does not exist or is not a directory",
                    dir
                )));
            }
        }

        let mut reports = Vec::with_capacity(directories.len());
        for dir in directories {
            let span = info_span!("sweep_dir", dir = %dir.display());
            let _enter = span.enter();
            let report = self.sweep_directory(dir, now)?;
            if report.is_noop() {
                debug!("nothing to do");
            }
            reports.push(report);
        }
        Ok(reports)
    }

    /// One pass over `dir`:
    ///
    /// 1. delete the oldest live files beyond `max_live_files`
    /// 2. zip the remaining live files at least `rotate_after` old, then
    ///    delete them
    /// 3. delete the oldest archives beyond `max_archive_files`
    /// 4. delete archives at least `purge_after` old
    pub fn sweep_directory(&self, dir: &Path, now: SystemTime) -> Result<SweepReport> {
        let mut report = SweepReport::new(dir);

        let mut live = self.live_files(dir, now)?;
        let excess = live.len().saturating_sub(self.policy.max_live_files);
        for (path, _) in live.drain(..excess) {
            self.fs.remove_file(&path)?;
            info!(file = %path.display(), "deleted live file over cap");
            report.removed_over_cap.push(path);
        }

        let rotate_age = self.policy.rotate_age();
        let to_rotate: Vec<PathBuf> = live
            .into_iter()
            .filter(|(_, mtime)| age(now, *mtime) >= rotate_age)
            .map(|(path, _)| path)
            .collect();

        let archive_dir = dir.join(ARCHIVE_DIR);
        if !to_rotate.is_empty() {
            let bytes = build_archive(self.fs.as_ref(), &to_rotate)
                .with_context(|| format!("archiving files in {:?}", dir))?;
            self.fs.create_dir_all(&archive_dir)?;
            let archive_path = unique_archive_path(
                self.fs.as_ref(),
                &archive_dir,
                &self.policy.archive_prefix,
                DateTime::<Local>::from(now),
            );
            self.fs.write(&archive_path, &bytes)?;
            info!(
                archive = %archive_path.display(),
                files = to_rotate.len(),
                "rotated live files into archive"
            );
            for path in &to_rotate {
                self.fs.remove_file(path)?;
            }
            report.rotated = to_rotate;
            report.archive = Some(archive_path);
        }

        if self.fs.is_dir(&archive_dir) {
            let mut archives = self.archives(&archive_dir)?;
            let excess = archives.len().saturating_sub(self.policy.max_archive_files);
            for (path, _) in archives.drain(..excess) {
                self.fs.remove_file(&path)?;
                info!(archive = %path.display(), "deleted archive over cap");
                report.archives_trimmed.push(path);
            }

            let purge_age = self.policy.purge_age();
            for (path, mtime) in archives {
                if age(now, mtime) >= purge_age {
                    self.fs.remove_file(&path)?;
                    info!(archive = %path.display(), "purged expired archive");
                    report.archives_purged.push(path);
                }
            }
        }

        Ok(report)
    }

    /// Live files in `dir`, oldest first.
    ///
    /// The hourly log for the current hour is skipped: a running scheduler or
    /// sweep may still be appending to it.
    fn live_files(&self, dir: &Path, now: SystemTime) -> Result<Vec<(PathBuf, SystemTime)>> {
        let matcher = &self.matcher;
        let open_log = open_log_suffix(now);
        self.files_by_age(dir, |name| matcher.is_live(name) && !name.ends_with(&open_log))
    }

    /// Archives in `archive_dir`, oldest first.
    fn archives(&self, archive_dir: &Path) -> Result<Vec<(PathBuf, SystemTime)>> {
        self.files_by_age(archive_dir, |name| name.ends_with(".zip"))
    }

    fn files_by_age<F>(&self, dir: &Path, keep: F) -> Result<Vec<(PathBuf, SystemTime)>>
    where
        F: Fn(&str) -> bool,
    {
        let mut files = Vec::new();
        for path in self.fs.read_dir(dir)? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !keep(name) || !self.fs.is_file(&path) {
                continue;
            }
            let mtime = self.fs.modified(&path)?;
            files.push((path, mtime));
        }
        files.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(files)
    }
}

/// Age of a file at `now`; future mtimes count as zero.
fn age(now: SystemTime, mtime: SystemTime) -> Duration {
    now.duration_since(mtime).unwrap_or(Duration::ZERO)
}
