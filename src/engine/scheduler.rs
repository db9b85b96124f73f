// src/engine/scheduler.rs

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use tracing::{error, info, info_span, warn, Instrument};

use crate::admission::{
    Admission, AdmissionController, LockDir, LockError, LockGuard, RunRecorder,
};
use crate::config::{Catalog, TaskDefinition};
use crate::errors::Result;
use crate::exec::{ExecutorBackend, TaskOutcome};
use crate::task::{CommandLine, PathResolver, TaskSignature};

use super::report::{Disposition, RunReport, TaskReport};

/// Knobs for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    /// Upper bound on attempted tasks; skips do not count.
    pub max_tasks: usize,
    /// Pause between two attempted tasks.
    pub interval_wait: Duration,
    pub dry_run: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            max_tasks: 100,
            interval_wait: Duration::from_secs(10),
            dry_run: false,
        }
    }
}

/// Walks the catalog once, in order, running admitted tasks one at a time.
pub struct SchedulerLoop<E: ExecutorBackend> {
    dir: LockDir,
    admission: AdmissionController,
    recorder: RunRecorder,
    executor: E,
    options: SchedulerOptions,
}

impl<E: ExecutorBackend> fmt::Debug for SchedulerLoop<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerLoop")
            .field("locks_dir", &self.dir.root())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> SchedulerLoop<E> {
    pub fn new(dir: LockDir, executor: E, options: SchedulerOptions) -> Self {
        Self {
            admission: AdmissionController::new(dir.clone()),
            recorder: RunRecorder::new(dir.clone()),
            dir,
            executor,
            options,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Evaluate every active task in catalog order until the budget is used.
    ///
    /// Only setup failures (the locks directory cannot be prepared) return
    /// `Err`; per-task failures end up in the report.
    pub async fn run(&mut self, catalog: &Catalog) -> Result<RunReport> {
        self.dir.ensure_layout()?;

        info!(
            locks_dir = %self.dir.root().display(),
            tasks = catalog.len(),
            active = catalog.active_count(),
            max_tasks = self.options.max_tasks,
            interval_wait = ?self.options.interval_wait,
            dry_run = self.options.dry_run,
            "scheduler started"
        );

        let resolver = PathResolver::new(catalog.base_paths());
        let mut report = RunReport::default();
        let mut used = 0usize;

        for (index, task) in catalog.iter() {
            if !task.is_active() {
                continue;
            }
            if used >= self.options.max_tasks {
                info!(max_tasks = self.options.max_tasks, "task budget reached");
                break;
            }

            let command = resolver.command_line(task);
            let signature = TaskSignature::new(&task.automation_id, &command);
            let span = info_span!(
                "task",
                automation_id = %task.automation_id,
                signature = %signature,
            );

            let pause_first = used > 0;
            let disposition = self
                .run_task(task, &command, &signature, pause_first)
                .instrument(span)
                .await;

            if disposition.counts_toward_budget() {
                used += 1;
            }
            report.tasks.push(TaskReport {
                index,
                automation_id: task.automation_id.clone(),
                signature,
                command,
                disposition,
            });
        }

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            would_run = report.would_run(),
            "scheduler finished"
        );
        Ok(report)
    }

    async fn run_task(
        &mut self,
        task: &TaskDefinition,
        command: &CommandLine,
        signature: &TaskSignature,
        pause_first: bool,
    ) -> Disposition {
        let now = Local::now();
        match self.admission.decide(signature, task.min_wait(), now) {
            Admission::Admitted => {}
            locked @ Admission::Locked { .. } => {
                if locked.lock_looks_stale(now) {
                    warn!(
                        task = task.label(),
                        lock = %self.dir.lock_path(signature).display(),
                        "lock file looks stale; remove it by hand if no run is in progress"
                    );
                } else {
                    info!(task = task.label(), "task is locked; skipping");
                }
                return Disposition::Locked;
            }
            Admission::CoolingDown { last_run, remaining } => {
                info!(
                    task = task.label(),
                    last_run = %last_run.to_rfc3339(),
                    remaining_secs = remaining.num_seconds(),
                    "task is cooling down; skipping"
                );
                return Disposition::CoolingDown;
            }
        }

        if self.options.dry_run {
            info!(task = task.label(), cmd = %command, "would run task");
            return Disposition::WouldRun;
        }

        let guard = match LockGuard::acquire(&self.dir, signature, &task.automation_id, command) {
            Ok(guard) => guard,
            Err(LockError::Held(_)) => {
                info!(task = task.label(), "another run took the lock first; skipping");
                return Disposition::Locked;
            }
            Err(e) => {
                error!(task = task.label(), error = %e, "could not create lock file");
                return Disposition::Attempted(TaskOutcome::Error(e.to_string()));
            }
        };

        // Pause only once the lock is ours.
        if pause_first && !self.options.interval_wait.is_zero() {
            tokio::time::sleep(self.options.interval_wait).await;
        }

        info!(task = task.label(), cmd = %command, "running task");
        let outcome = match AssertUnwindSafe(self.executor.run(command))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(payload) => {
                TaskOutcome::Error(format!("panic: {}", panic_message(payload.as_ref())))
            }
        };

        let outcome = match outcome {
            TaskOutcome::Success => {
                match self.recorder.on_success(signature, command, Local::now()) {
                    Ok(()) => {
                        info!(task = task.label(), "task succeeded");
                        TaskOutcome::Success
                    }
                    Err(e) => {
                        error!(
                            task = task.label(),
                            error = %format!("{e:#}"),
                            "task ran but its last run could not be recorded"
                        );
                        TaskOutcome::Error(format!("recording last run: {e:#}"))
                    }
                }
            }
            TaskOutcome::Failed(code) => {
                error!(task = task.label(), exit_code = code, cmd = %command, "task failed");
                TaskOutcome::Failed(code)
            }
            TaskOutcome::Error(msg) => {
                error!(task = task.label(), error = %msg, cmd = %command, "task could not be run");
                TaskOutcome::Error(msg)
            }
        };

        if let Err(e) = guard.release() {
            warn!(error = %format!("{e:#}"), "failed to remove lock file");
        }

        Disposition::Attempted(outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
