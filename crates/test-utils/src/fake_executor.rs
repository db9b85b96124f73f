use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use autosched::admission::LockDir;
use autosched::exec::{ExecutorBackend, TaskOutcome};
use autosched::task::CommandLine;

/// A fake executor that:
/// - records every command it was asked to run
/// - returns a scripted outcome per script path (default: `Success`)
/// - optionally panics for a given script path
/// - optionally counts the lock files present while a task "runs".
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<CommandLine>>>,
    outcomes: HashMap<String, TaskOutcome>,
    panics: HashSet<String>,
    lock_dir: Option<LockDir>,
    locks_seen: Arc<Mutex<Vec<usize>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, script: &str, outcome: TaskOutcome) -> Self {
        self.outcomes.insert(script.to_string(), outcome);
        self
    }

    pub fn panic_on(mut self, script: &str) -> Self {
        self.panics.insert(script.to_string());
        self
    }

    pub fn observe_locks(mut self, dir: LockDir) -> Self {
        self.lock_dir = Some(dir);
        self
    }

    pub fn executed(&self) -> Vec<CommandLine> {
        self.executed.lock().unwrap().clone()
    }

    /// Script path (second argv element) of every executed command.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.executed()
            .iter()
            .map(|c| c.args().first().cloned().unwrap_or_default())
            .collect()
    }

    /// Number of lock files seen at the start of each run.
    pub fn locks_seen(&self) -> Vec<usize> {
        self.locks_seen.lock().unwrap().clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandLine,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        Box::pin(async move {
            let script = command.args().first().cloned().unwrap_or_default();

            if let Some(dir) = &self.lock_dir {
                let count = dir.lock_files().map(|l| l.len()).unwrap_or(0);
                self.locks_seen.lock().unwrap().push(count);
            }
            self.executed.lock().unwrap().push(command.clone());

            if self.panics.contains(&script) {
                panic!("fake executor told to panic on {script}");
            }
            self.outcomes
                .get(&script)
                .cloned()
                .unwrap_or(TaskOutcome::Success)
        })
    }
}
