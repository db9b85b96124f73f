use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

/// Unit attached to a numeric threshold (`--interval_wait_units`, the
/// sweeper's rotate/purge ages).
///
/// A month is treated as 30 days. The short spellings (`sec`, `min`, ...)
/// are accepted for compatibility with older maintenance configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "sec", alias = "second")]
    #[value(alias = "sec", alias = "second")]
    Seconds,
    #[serde(alias = "min", alias = "minute")]
    #[value(alias = "min", alias = "minute")]
    Minutes,
    #[serde(alias = "hour")]
    #[value(alias = "hour")]
    Hours,
    #[serde(alias = "day")]
    #[value(alias = "day")]
    Days,
    #[serde(alias = "month")]
    #[value(alias = "month")]
    Months,
}

impl TimeUnit {
    pub fn seconds_per_unit(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 60 * 60,
            TimeUnit::Days => 24 * 60 * 60,
            TimeUnit::Months => 30 * 24 * 60 * 60,
        }
    }

    /// Convert `amount` of this unit into a [`Duration`].
    ///
    /// Negative or non-finite amounts collapse to zero.
    pub fn duration(self, amount: f64) -> Duration {
        let secs = amount * self.seconds_per_unit() as f64;
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for TimeUnit {
    fn default() -> Self {
        TimeUnit::Seconds
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seconds" | "second" | "sec" => Ok(TimeUnit::Seconds),
            "minutes" | "minute" | "min" => Ok(TimeUnit::Minutes),
            "hours" | "hour" => Ok(TimeUnit::Hours),
            "days" | "day" => Ok(TimeUnit::Days),
            "months" | "month" => Ok(TimeUnit::Months),
            other => Err(format!(
                "invalid time unit: {other} (expected seconds, minutes, hours, days or months)"
            )),
        }
    }
}

/// Schedule state of a task in the catalog.
///
/// Only `"active"` tasks are considered by the scheduler; every other value
/// is kept verbatim for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    Active,
    Other(String),
}

impl ScheduleState {
    pub fn is_active(&self) -> bool {
        matches!(self, ScheduleState::Active)
    }
}

impl From<String> for ScheduleState {
    fn from(s: String) -> Self {
        if s == "active" {
            ScheduleState::Active
        } else {
            ScheduleState::Other(s)
        }
    }
}

impl<'de> Deserialize<'de> for ScheduleState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(ScheduleState::from)
    }
}
