// src/engine/report.rs

use crate::config::TaskIndex;
use crate::exec::TaskOutcome;
use crate::task::{CommandLine, TaskSignature};

/// What happened to one evaluated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// A lock file existed, or another process won the lock race.
    Locked,
    CoolingDown,
    /// Admitted in dry-run mode; nothing was executed.
    WouldRun,
    Attempted(TaskOutcome),
}

impl Disposition {
    /// Whether this task used up one slot of `max_tasks`.
    pub fn counts_toward_budget(&self) -> bool {
        matches!(self, Disposition::Attempted(_) | Disposition::WouldRun)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Disposition::Locked | Disposition::CoolingDown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub index: TaskIndex,
    pub automation_id: String,
    pub signature: TaskSignature,
    pub command: CommandLine,
    pub disposition: Disposition,
}

/// Summary of one scheduler invocation, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
}

impl RunReport {
    pub fn attempted(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Attempted(_)))
    }

    pub fn succeeded(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Attempted(TaskOutcome::Success)))
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn skipped(&self) -> usize {
        self.count(Disposition::is_skip)
    }

    pub fn would_run(&self) -> usize {
        self.count(|d| matches!(d, Disposition::WouldRun))
    }

    /// First report for `automation_id`, if it was evaluated.
    pub fn find(&self, automation_id: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.automation_id == automation_id)
    }

    fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&Disposition) -> bool,
    {
        self.tasks.iter().filter(|t| pred(&t.disposition)).count()
    }
}
