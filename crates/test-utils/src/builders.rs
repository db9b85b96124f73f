#![allow(dead_code)]

use autosched::config::{BasePaths, Catalog, TaskDefinition};
use autosched::types::ScheduleState;

/// Builder for an in-memory `Catalog`, bypassing the JSON loader.
pub struct ScheduleBuilder {
    base_paths: Vec<(String, String)>,
    tasks: Vec<TaskDefinition>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self {
            base_paths: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Add a base path alias. The value is used as-is (no `$VAR` lookup).
    pub fn base_path(mut self, alias: &str, path: &str) -> Self {
        self.base_paths.push((alias.to_string(), path.to_string()));
        self
    }

    pub fn with_task(mut self, task: TaskDefinition) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> Catalog {
        let base_paths: BasePaths = self.base_paths.into_iter().collect();
        Catalog::new_unchecked(base_paths, self.tasks)
    }
}

impl Default for ScheduleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single active `TaskDefinition` with no cooldown.
pub struct TaskBuilder {
    task: TaskDefinition,
}

impl TaskBuilder {
    pub fn new(automation_id: &str, interpreter: &str, script_path: &str) -> Self {
        Self {
            task: TaskDefinition {
                automation_id: automation_id.to_string(),
                name: None,
                script_path: script_path.to_string(),
                interpreter: interpreter.to_string(),
                arguments: Vec::new(),
                schedule: ScheduleState::Active,
                min_wait_min: 0.0,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.task.name = Some(name.to_string());
        self
    }

    pub fn arg(mut self, template: &str) -> Self {
        self.task.arguments.push(template.to_string());
        self
    }

    pub fn min_wait_min(mut self, minutes: f64) -> Self {
        self.task.min_wait_min = minutes;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.task.schedule = ScheduleState::Other("inactive".to_string());
        self
    }

    pub fn build(self) -> TaskDefinition {
        self.task
    }
}
