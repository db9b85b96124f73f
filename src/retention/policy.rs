// src/retention/policy.rs

//! Retention thresholds and the live-file matcher.
//!
//! A policy file looks like:
//!
//! ```toml
//! rotate_after = 5
//! rotate_unit = "min"
//! purge_after = 7
//! purge_unit = "day"
//! max_live_files = 8
//! max_archive_files = 8
//! include = ["*.log"]
//! exclude = ["*.lastrun"]
//! archive_prefix = "autosched_maint"
//! ```
//!
//! Every key is optional; CLI flags are applied on top with
//! [`RetentionPolicy::apply_overrides`].

use std::path::Path;
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::cli::SweepArgs;
use crate::errors::{AutoschedError, Result};
use crate::fs::FileSystem;
use crate::types::TimeUnit;

/// Pattern excluded from every sweep regardless of configuration.
pub const ALWAYS_EXCLUDED: &str = "*.lock";

pub const DEFAULT_ARCHIVE_PREFIX: &str = "autosched_maint";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionPolicy {
    pub rotate_after: f64,
    pub rotate_unit: TimeUnit,
    pub purge_after: f64,
    pub purge_unit: TimeUnit,
    pub max_live_files: usize,
    pub max_archive_files: usize,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub archive_prefix: String,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            rotate_after: 5.0,
            rotate_unit: TimeUnit::Minutes,
            purge_after: 7.0,
            purge_unit: TimeUnit::Days,
            max_live_files: 8,
            max_archive_files: 8,
            include: vec!["*.log".to_string()],
            exclude: vec!["*.lastrun".to_string()],
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
        }
    }
}

impl RetentionPolicy {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let policy: RetentionPolicy = toml::from_str(text)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs.read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Replace values with the ones given on the command line.
    pub fn apply_overrides(&mut self, args: &SweepArgs) {
        if let Some(v) = args.rotate_after {
            self.rotate_after = v;
        }
        if let Some(u) = args.rotate_unit {
            self.rotate_unit = u;
        }
        if let Some(v) = args.purge_after {
            self.purge_after = v;
        }
        if let Some(u) = args.purge_unit {
            self.purge_unit = u;
        }
        if let Some(n) = args.max_live_files {
            self.max_live_files = n;
        }
        if let Some(n) = args.max_archive_files {
            self.max_archive_files = n;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("rotate_after", self.rotate_after),
            ("purge_after", self.purge_after),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AutoschedError::ConfigError(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.include.is_empty() {
            return Err(AutoschedError::ConfigError(
                "include must list at least one pattern".to_string(),
            ));
        }

        let prefix = self.archive_prefix.trim();
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(AutoschedError::ConfigError(format!(
                "invalid archive_prefix '{}'",
                self.archive_prefix
            )));
        }

        self.matcher().map(|_| ())
    }

    pub fn rotate_age(&self) -> Duration {
        self.rotate_unit.duration(self.rotate_after)
    }

    pub fn purge_age(&self) -> Duration {
        self.purge_unit.duration(self.purge_after)
    }

    /// Compile the include/exclude lists.
    pub fn matcher(&self) -> Result<FileMatcher> {
        let include = build_globset(self.include.iter().map(String::as_str))?;
        let exclude = build_globset(
            self.exclude
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(ALWAYS_EXCLUDED)),
        )?;
        Ok(FileMatcher { include, exclude })
    }
}

/// Decides which file names count as live files.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileMatcher {
    pub fn is_live(&self, file_name: &str) -> bool {
        self.include.is_match(file_name) && !self.exclude.is_match(file_name)
    }
}

fn build_globset<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            AutoschedError::ConfigError(format!("invalid glob pattern '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| AutoschedError::ConfigError(format!("building glob set: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_maintenance_script() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.rotate_age(), Duration::from_secs(5 * 60));
        assert_eq!(policy.purge_age(), Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(policy.max_live_files, 8);
        assert_eq!(policy.max_archive_files, 8);
    }

    #[test]
    fn toml_accepts_short_unit_names_and_partial_tables() {
        let policy = RetentionPolicy::from_toml_str(
            r#"
            rotate_after = 2
            rotate_unit = "hour"
            purge_unit = "month"
            "#,
        )
        .unwrap();
        assert_eq!(policy.rotate_age(), Duration::from_secs(2 * 3600));
        assert_eq!(policy.purge_age(), Duration::from_secs(7 * 30 * 24 * 3600));
        assert_eq!(policy.include, vec!["*.log".to_string()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RetentionPolicy::from_toml_str("max_files = 3").unwrap_err();
        assert!(matches!(err, AutoschedError::TomlError(_)));
    }

    #[test]
    fn negative_threshold_is_a_config_error() {
        let err = RetentionPolicy::from_toml_str("purge_after = -1").unwrap_err();
        assert!(matches!(err, AutoschedError::ConfigError(_)));
    }

    #[test]
    fn lock_files_never_match_even_when_included() {
        let policy = RetentionPolicy {
            include: vec!["*".to_string()],
            exclude: Vec::new(),
            ..RetentionPolicy::default()
        };
        let matcher = policy.matcher().unwrap();
        assert!(matcher.is_live("job.log"));
        assert!(matcher.is_live("JOB_abc.lastrun"));
        assert!(!matcher.is_live("JOB_abc.lock"));
    }

    #[test]
    fn default_matcher_skips_lastrun() {
        let matcher = RetentionPolicy::default().matcher().unwrap();
        assert!(matcher.is_live("host_batch_prog.2026-10-17-08.log"));
        assert!(!matcher.is_live("JOB_abc.lastrun"));
        assert!(!matcher.is_live("notes.txt"));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let mut policy = RetentionPolicy::from_toml_str("max_live_files = 20").unwrap();
        let args = SweepArgs::try_parse_from([
            "autosched-sweep",
            "--max-live-files=3",
            "--rotate-after=0",
        ])
        .unwrap();
        policy.apply_overrides(&args);
        assert_eq!(policy.max_live_files, 3);
        assert_eq!(policy.rotate_age(), Duration::ZERO);
        assert_eq!(policy.max_archive_files, 8);
    }
}
