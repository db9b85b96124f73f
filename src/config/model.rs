// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::types::ScheduleState;

/// Automation id given to tasks that do not declare one.
pub const ORPHAN_TASK: &str = "ORPHAN_TASK";

/// Job schedule as read from JSON, before validation.
///
/// ```json
/// {
///   "base_paths": { "util": "$AUTOSCHED_UTIL_PYTHON", "data": "/srv/data" },
///   "tasks": [
///     {
///       "automation_id": "WIKI_SUBJECTS",
///       "schedule": "active",
///       "script_path": "{util}/subj_gen.py",
///       "interpreter": "python3",
///       "arguments": { "arg_1": "{data}/subjects.json", "arg_2": "25" },
///       "min_wait_min": 30
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSchedule {
    #[serde(default)]
    pub base_paths: BTreeMap<String, String>,

    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

/// One entry of `tasks`, as written in the schedule file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub automation_id: Option<String>,

    /// Display name, only used in logs.
    #[serde(default)]
    pub name: Option<String>,

    /// `"active"` or anything else (inactive).
    pub schedule: ScheduleState,

    /// Script path template; may contain `{alias}` tokens.
    pub script_path: String,

    pub interpreter: String,

    #[serde(default)]
    pub arguments: RawArguments,

    /// Minimum minutes between two successful runs of the same signature.
    #[serde(default)]
    pub min_wait_min: Minutes,
}

/// Argument list in either of the accepted shapes.
///
/// The keyed form (`{"arg_1": .., "arg_2": ..}`) is positional by key number:
/// for N entries, `arg_1` through `arg_N` are read in order and a missing key
/// yields an empty string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArguments {
    Positional(Vec<Value>),
    Keyed(serde_json::Map<String, Value>),
}

impl Default for RawArguments {
    fn default() -> Self {
        RawArguments::Positional(Vec::new())
    }
}

impl RawArguments {
    pub fn into_templates(self) -> Vec<String> {
        match self {
            RawArguments::Positional(values) => values.iter().map(value_to_arg).collect(),
            RawArguments::Keyed(map) => (1..=map.len())
                .map(|i| {
                    map.get(&format!("arg_{i}"))
                        .map(value_to_arg)
                        .unwrap_or_default()
                })
                .collect(),
        }
    }
}

fn value_to_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `min_wait_min` accepts a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Minutes(pub f64);

impl<'de> Deserialize<'de> for Minutes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString {
            Number(f64),
            Text(String),
        }

        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(Minutes(n)),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Minutes)
                .map_err(|_| serde::de::Error::custom(format!("invalid min_wait_min: {s:?}"))),
        }
    }
}

/// Alias → path table with `$ENV_VAR` values already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePaths {
    entries: BTreeMap<String, String>,
}

impl BasePaths {
    /// Resolve `$NAME` values through `env`, keeping the literal value when the
    /// variable is unset.
    pub fn resolve<F>(raw: BTreeMap<String, String>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let entries = raw
            .into_iter()
            .map(|(alias, value)| {
                let resolved = resolve_env_value(&value, &env);
                (alias, resolved)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BasePaths {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// `$NAME` → value of `NAME`, or the literal input when unset / not a `$` value.
pub fn resolve_env_value<F>(value: &str, env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match value.strip_prefix('$') {
        Some(var) => env(var).unwrap_or_else(|| value.to_string()),
        None => value.to_string(),
    }
}

/// Longest cooldown a task can have; larger `min_wait_min` values are clamped.
pub const MAX_MIN_WAIT_DAYS: i64 = 100 * 365;

/// Validated task, immutable for one scheduler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    pub automation_id: String,
    pub name: Option<String>,
    pub script_path: String,
    pub interpreter: String,
    pub arguments: Vec<String>,
    pub schedule: ScheduleState,
    pub min_wait_min: f64,
}

impl TaskDefinition {
    pub fn is_active(&self) -> bool {
        self.schedule.is_active()
    }

    /// Name used in log lines: the display name when given, else the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.automation_id)
    }

    /// Cooldown as a chrono duration (millisecond precision), capped at
    /// [`MAX_MIN_WAIT_DAYS`].
    pub fn min_wait(&self) -> chrono::Duration {
        let cap = chrono::Duration::days(MAX_MIN_WAIT_DAYS);
        let millis = (self.min_wait_min * 60_000.0).round();
        if millis >= cap.num_milliseconds() as f64 {
            return cap;
        }
        chrono::Duration::milliseconds(millis as i64)
    }
}

/// Stable position of a task in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskIndex(pub usize);

/// In-memory catalog loaded once per invocation.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    base_paths: BasePaths,
    tasks: Vec<TaskDefinition>,
}

impl Catalog {
    /// Build a catalog from parts that are already valid.
    ///
    /// Use [`crate::config::load_and_validate`] for files on disk.
    pub fn new_unchecked(base_paths: BasePaths, tasks: Vec<TaskDefinition>) -> Self {
        Self { base_paths, tasks }
    }

    pub fn base_paths(&self) -> &BasePaths {
        &self.base_paths
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: TaskIndex) -> Option<&TaskDefinition> {
        self.tasks.get(index.0)
    }

    /// All tasks in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskIndex, &TaskDefinition)> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| (TaskIndex(i), task))
    }

    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_active()).count()
    }
}
