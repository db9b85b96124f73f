// src/config/validate.rs

use crate::config::model::{
    BasePaths, Catalog, ORPHAN_TASK, RawSchedule, RawTask, TaskDefinition,
};
use crate::errors::{AutoschedError, Result};

impl TryFrom<RawSchedule> for Catalog {
    type Error = AutoschedError;

    fn try_from(raw: RawSchedule) -> std::result::Result<Self, Self::Error> {
        validate_schedule(raw, |name| std::env::var(name).ok())
    }
}

/// Validate a raw schedule, resolving `$ENV_VAR` base paths through `env`.
pub fn validate_schedule<F>(raw: RawSchedule, env: F) -> Result<Catalog>
where
    F: Fn(&str) -> Option<String>,
{
    validate_base_paths(&raw)?;

    let tasks = raw
        .tasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| validate_task(i, task))
        .collect::<Result<Vec<_>>>()?;

    let base_paths = BasePaths::resolve(raw.base_paths, env);
    Ok(Catalog::new_unchecked(base_paths, tasks))
}

fn validate_base_paths(raw: &RawSchedule) -> Result<()> {
    for alias in raw.base_paths.keys() {
        if alias.is_empty() || !alias.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(AutoschedError::ConfigError(format!(
                "base_paths alias '{}' must consist of letters, digits or '_'",
                alias
            )));
        }
    }
    Ok(())
}

fn validate_task(index: usize, task: RawTask) -> Result<TaskDefinition> {
    let automation_id = task
        .automation_id
        .unwrap_or_else(|| ORPHAN_TASK.to_string());

    // The id becomes part of the lock / lastrun file names.
    if automation_id.contains(['/', '\\']) || automation_id == "." || automation_id == ".." {
        return Err(AutoschedError::ConfigError(format!(
            "tasks[{}]: automation_id '{}' cannot be used in a file name",
            index, automation_id
        )));
    }

    if task.interpreter.trim().is_empty() {
        return Err(AutoschedError::ConfigError(format!(
            "tasks[{}] ({}): interpreter must not be empty",
            index, automation_id
        )));
    }

    if task.script_path.trim().is_empty() {
        return Err(AutoschedError::ConfigError(format!(
            "tasks[{}] ({}): script_path must not be empty",
            index, automation_id
        )));
    }

    let min_wait_min = task.min_wait_min.0;
    if !min_wait_min.is_finite() || min_wait_min < 0.0 {
        return Err(AutoschedError::ConfigError(format!(
            "tasks[{}] ({}): min_wait_min must be a non-negative number (got {})",
            index, automation_id, min_wait_min
        )));
    }

    Ok(TaskDefinition {
        automation_id,
        name: task.name,
        script_path: task.script_path,
        interpreter: task.interpreter,
        arguments: task.arguments.into_templates(),
        schedule: task.schedule,
        min_wait_min,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawSchedule {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_automation_id_becomes_orphan() {
        let raw = parse(
            r#"{"tasks": [{"schedule": "active", "script_path": "a.py", "interpreter": "python3"}]}"#,
        );
        let catalog = validate_schedule(raw, |_| None).unwrap();
        let (_, task) = catalog.iter().next().unwrap();
        assert_eq!(task.automation_id, ORPHAN_TASK);
        assert_eq!(task.min_wait_min, 0.0);
        assert!(task.arguments.is_empty());
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let raw = parse(
            r#"{"tasks": [{"automation_id": "A", "schedule": "active", "script_path": "a.py",
                "interpreter": "python3", "min_wait_min": -1}]}"#,
        );
        match validate_schedule(raw, |_| None) {
            Err(AutoschedError::ConfigError(msg)) => assert!(msg.contains("min_wait_min")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn path_separator_in_id_is_rejected() {
        let raw = parse(
            r#"{"tasks": [{"automation_id": "../A", "schedule": "active", "script_path": "a.py",
                "interpreter": "python3"}]}"#,
        );
        assert!(matches!(
            validate_schedule(raw, |_| None),
            Err(AutoschedError::ConfigError(_))
        ));
    }

    #[test]
    fn base_paths_are_resolved_against_env() {
        let raw = parse(r#"{"base_paths": {"util": "$UTIL"}, "tasks": []}"#);
        let catalog = validate_schedule(raw, |name| {
            (name == "UTIL").then(|| "/opt/util".to_string())
        })
        .unwrap();
        assert_eq!(catalog.base_paths().get("util"), Some("/opt/util"));
        assert!(catalog.is_empty());
    }
}
