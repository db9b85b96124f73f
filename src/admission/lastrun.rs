// src/admission/lastrun.rs

//! Last-successful-run records.
//!
//! Format (two lines, no trailing newline):
//!
//! ```text
//! python3 /opt/util/subj_gen.py /srv/data/subjects.json 25
//! 2026-10-17T09:41:07.123456+02:00
//! ```
//!
//! Records written by older tooling carry a naive local timestamp
//! (`2024-05-01T12:00:00.123456`); both forms are read.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone};
use tracing::debug;

use crate::admission::LockDir;
use crate::task::{CommandLine, TaskSignature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRunRecord {
    /// Command line stored on the first line, when the record has two lines.
    pub command: Option<String>,
    pub timestamp: DateTime<Local>,
}

/// What admission learns from a lastrun file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastRunState {
    /// No record, or an empty one.
    Never,
    Recorded(LastRunRecord),
    /// The file exists but could not be read or parsed.
    Unreadable(String),
}

impl LastRunRecord {
    /// Parse a record.
    ///
    /// With two or more lines the timestamp is on line 2, with a single line
    /// it is that line. An empty file yields `Ok(None)`.
    pub fn parse(contents: &str) -> std::result::Result<Option<Self>, String> {
        let lines: Vec<&str> = contents.lines().collect();
        let (command, stamp) = match lines.as_slice() {
            [] => return Ok(None),
            [only] => (None, only.trim()),
            [first, second, ..] => (Some(first.trim().to_string()), second.trim()),
        };
        if stamp.is_empty() && command.is_none() {
            return Ok(None);
        }
        let timestamp =
            parse_timestamp(stamp).ok_or_else(|| format!("invalid timestamp {stamp:?}"))?;
        Ok(Some(Self { command, timestamp }))
    }

    pub fn render(command: &str, at: DateTime<Local>) -> String {
        format!(
            "{}\n{}",
            command,
            at.to_rfc3339_opts(SecondsFormat::Micros, false)
        )
    }
}

/// RFC 3339 first, then naive ISO-8601 interpreted as local time.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Persists the last-successful-run timestamp per signature.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    dir: LockDir,
}

impl RunRecorder {
    pub fn new(dir: LockDir) -> Self {
        Self { dir }
    }

    /// Overwrite the lastrun record after a successful execution.
    pub fn on_success(
        &self,
        signature: &TaskSignature,
        command: &CommandLine,
        at: DateTime<Local>,
    ) -> Result<()> {
        let path = self.dir.lastrun_path(signature);
        let contents = LastRunRecord::render(&command.joined(), at);
        self.dir.fs().write(&path, contents.as_bytes())?;
        debug!(signature = %signature, path = ?path, "last run recorded");
        Ok(())
    }

    pub fn load(&self, signature: &TaskSignature) -> LastRunState {
        load_state(&self.dir, signature)
    }
}

pub(crate) fn load_state(dir: &LockDir, signature: &TaskSignature) -> LastRunState {
    let path = dir.lastrun_path(signature);
    if !dir.fs().exists(&path) {
        return LastRunState::Never;
    }
    let contents = match dir.fs().read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return LastRunState::Unreadable(format!("{e:#}")),
    };
    match LastRunRecord::parse(&contents) {
        Ok(Some(record)) => LastRunState::Recorded(record),
        Ok(None) => LastRunState::Never,
        Err(reason) => LastRunState::Unreadable(reason),
    }
}
