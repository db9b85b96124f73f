// tests/scheduler_scenarios.rs

use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use autosched::admission::{LockDir, RunRecorder};
use autosched::config::Catalog;
use autosched::engine::{Disposition, RunReport, SchedulerLoop, SchedulerOptions};
use autosched::exec::TaskOutcome;
use autosched::task::{CommandLine, TaskSignature};
use autosched_test_utils::builders::{ScheduleBuilder, TaskBuilder};
use autosched_test_utils::fake_executor::FakeExecutor;
use autosched_test_utils::{init_tracing, with_timeout};

fn options(max_tasks: usize) -> SchedulerOptions {
    SchedulerOptions {
        max_tasks,
        interval_wait: Duration::ZERO,
        dry_run: false,
    }
}

async fn run_once(
    locks: &Path,
    catalog: &Catalog,
    executor: FakeExecutor,
    options: SchedulerOptions,
) -> RunReport {
    let mut scheduler = SchedulerLoop::new(LockDir::on_disk(locks), executor, options);
    with_timeout(scheduler.run(catalog)).await.unwrap()
}

fn lock_count(locks: &Path) -> usize {
    LockDir::on_disk(locks).lock_files().unwrap().len()
}

fn signature_of(id: &str, parts: &[&str]) -> TaskSignature {
    let cmd = CommandLine::new(parts.iter().map(|p| p.to_string()).collect());
    TaskSignature::new(id, &cmd)
}

#[tokio::test]
async fn fresh_task_runs_once_and_records_last_run() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("JOB_A", "python3", "a.py").build())
        .build();
    let executor = FakeExecutor::new().observe_locks(LockDir::on_disk(locks.path()));

    let report = run_once(locks.path(), &catalog, executor.clone(), options(100)).await;

    assert_eq!(report.attempted(), 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(executor.executed_scripts(), vec!["a.py".to_string()]);
    // The lock existed while the task ran and is gone afterwards.
    assert_eq!(executor.locks_seen(), vec![1]);
    assert_eq!(lock_count(locks.path()), 0);

    let sig = signature_of("JOB_A", &["python3", "a.py"]);
    let lastrun = std::fs::read_to_string(locks.path().join(sig.lastrun_file_name())).unwrap();
    assert_eq!(lastrun.lines().next(), Some("python3 a.py"));
    assert!(locks.path().join("archive").is_dir());
}

#[tokio::test]
async fn immediate_rerun_is_cooling_down() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(
            TaskBuilder::new("JOB_A", "python3", "a.py")
                .min_wait_min(30.0)
                .build(),
        )
        .build();
    let executor = FakeExecutor::new();

    run_once(locks.path(), &catalog, executor.clone(), options(100)).await;
    let second = run_once(locks.path(), &catalog, executor.clone(), options(100)).await;

    assert_eq!(second.tasks.len(), 1);
    assert_eq!(second.tasks[0].disposition, Disposition::CoolingDown);
    assert_eq!(executor.executed().len(), 1);
}

#[tokio::test]
async fn leftover_lock_is_honoured_and_not_cleared() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let sig = signature_of("JOB_A", &["python3", "a.py"]);
    let lock_path = locks.path().join(sig.lock_file_name());
    std::fs::write(&lock_path, "left behind by a killed run").unwrap();

    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("JOB_A", "python3", "a.py").build())
        .build();
    let executor = FakeExecutor::new();

    let report = run_once(locks.path(), &catalog, executor.clone(), options(100)).await;

    assert_eq!(report.tasks[0].disposition, Disposition::Locked);
    assert!(executor.executed().is_empty());
    assert!(lock_path.exists());
}

#[tokio::test]
async fn budget_caps_attempted_tasks() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let mut builder = ScheduleBuilder::new();
    for i in 0..10 {
        builder = builder.with_task(
            TaskBuilder::new(&format!("JOB_{i}"), "python3", &format!("job_{i}.py")).build(),
        );
    }
    let catalog = builder.build();
    let executor = FakeExecutor::new();

    let report = run_once(locks.path(), &catalog, executor.clone(), options(3)).await;

    assert_eq!(report.attempted(), 3);
    assert_eq!(report.tasks.len(), 3);
    assert_eq!(
        executor.executed_scripts(),
        vec!["job_0.py", "job_1.py", "job_2.py"]
    );
}

#[tokio::test]
async fn skipped_tasks_do_not_use_budget() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    for id in ["JOB_0", "JOB_1"] {
        let sig = signature_of(id, &["sh", &format!("{}.sh", id.to_lowercase())]);
        std::fs::write(locks.path().join(sig.lock_file_name()), "held").unwrap();
    }
    let mut builder = ScheduleBuilder::new();
    for i in 0..5 {
        builder = builder
            .with_task(TaskBuilder::new(&format!("JOB_{i}"), "sh", &format!("job_{i}.sh")).build());
    }
    let executor = FakeExecutor::new();

    let report = run_once(locks.path(), &builder.build(), executor.clone(), options(2)).await;

    assert_eq!(report.skipped(), 2);
    assert_eq!(executor.executed_scripts(), vec!["job_2.sh", "job_3.sh"]);
}

#[tokio::test]
async fn failing_task_keeps_last_run_untouched_and_loop_continues() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("BAD", "python3", "bad.py").build())
        .with_task(TaskBuilder::new("GOOD", "python3", "good.py").build())
        .build();
    let executor = FakeExecutor::new().with_outcome("bad.py", TaskOutcome::Failed(2));

    let report = run_once(locks.path(), &catalog, executor, options(100)).await;

    assert_eq!(
        report.find("BAD").unwrap().disposition,
        Disposition::Attempted(TaskOutcome::Failed(2))
    );
    assert_eq!(
        report.find("GOOD").unwrap().disposition,
        Disposition::Attempted(TaskOutcome::Success)
    );
    let bad = signature_of("BAD", &["python3", "bad.py"]);
    assert!(!locks.path().join(bad.lastrun_file_name()).exists());
    assert_eq!(lock_count(locks.path()), 0);
}

#[tokio::test]
async fn host_errors_and_panics_release_the_lock() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("SPAWN", "missing-interp", "x.py").build())
        .with_task(TaskBuilder::new("BOOM", "python3", "boom.py").build())
        .with_task(TaskBuilder::new("AFTER", "python3", "after.py").build())
        .build();
    let executor = FakeExecutor::new()
        .with_outcome("x.py", TaskOutcome::Error("no such file".to_string()))
        .panic_on("boom.py");

    let report = run_once(locks.path(), &catalog, executor.clone(), options(100)).await;

    assert!(matches!(
        report.find("SPAWN").unwrap().disposition,
        Disposition::Attempted(TaskOutcome::Error(_))
    ));
    match &report.find("BOOM").unwrap().disposition {
        Disposition::Attempted(TaskOutcome::Error(msg)) => assert!(msg.contains("panic")),
        other => panic!("expected a panic error, got {:?}", other),
    }
    assert_eq!(executor.executed().len(), 3);
    assert_eq!(lock_count(locks.path()), 0);
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("JOB_A", "python3", "a.py").build())
        .with_task(TaskBuilder::new("JOB_B", "python3", "b.py").build())
        .build();
    let executor = FakeExecutor::new();
    let opts = SchedulerOptions {
        dry_run: true,
        ..options(1)
    };

    let report = run_once(locks.path(), &catalog, executor.clone(), opts).await;

    assert_eq!(report.would_run(), 1);
    assert_eq!(report.tasks.len(), 1);
    assert!(executor.executed().is_empty());
    let names: Vec<_> = std::fs::read_dir(locks.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["archive".to_string()]);
}

#[tokio::test]
async fn inactive_tasks_are_not_evaluated() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("OFF", "python3", "off.py").inactive().build())
        .with_task(TaskBuilder::new("ON", "python3", "on.py").build())
        .build();
    let executor = FakeExecutor::new();

    let report = run_once(locks.path(), &catalog, executor.clone(), options(100)).await;

    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].automation_id, "ON");
    assert_eq!(executor.executed_scripts(), vec!["on.py"]);
}

#[tokio::test]
async fn changed_argument_gets_its_own_cooldown() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .base_path("data", "/srv/data")
        .with_task(
            TaskBuilder::new("SUBJ", "python3", "gen.py")
                .arg("{data}/a.json")
                .min_wait_min(60.0)
                .build(),
        )
        .with_task(
            TaskBuilder::new("SUBJ", "python3", "gen.py")
                .arg("{data}/b.json")
                .min_wait_min(60.0)
                .build(),
        )
        .build();
    let executor = FakeExecutor::new();

    let report = run_once(locks.path(), &catalog, executor.clone(), options(100)).await;

    assert_eq!(report.attempted(), 2);
    assert_ne!(report.tasks[0].signature, report.tasks[1].signature);
    let args: Vec<String> = executor
        .executed()
        .iter()
        .map(|c| c.args()[1].clone())
        .collect();
    assert_eq!(args, vec!["/srv/data/a.json", "/srv/data/b.json"]);
}

#[tokio::test]
async fn waits_only_between_attempted_tasks() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("A", "sh", "a.sh").build())
        .with_task(TaskBuilder::new("B", "sh", "b.sh").build())
        .with_task(TaskBuilder::new("C", "sh", "c.sh").build())
        .build();
    let opts = SchedulerOptions {
        interval_wait: Duration::from_millis(50),
        ..options(100)
    };

    let started = Instant::now();
    let report = run_once(locks.path(), &catalog, FakeExecutor::new(), opts).await;
    let elapsed = started.elapsed();

    assert_eq!(report.attempted(), 3);
    // Two pauses for three tasks.
    assert!(elapsed >= Duration::from_millis(100), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn skips_and_the_last_task_never_pause() {
    init_tracing();
    let locks = TempDir::new().unwrap();
    let dir = LockDir::on_disk(locks.path());
    dir.ensure_layout().unwrap();

    // B and F are locked, D ran moments ago and is cooling down.
    for id in ["B", "F"] {
        let sig = signature_of(id, &["sh", &format!("{}.sh", id.to_lowercase())]);
        std::fs::write(locks.path().join(sig.lock_file_name()), "held").unwrap();
    }
    let d_cmd = CommandLine::new(vec!["sh".into(), "d.sh".into()]);
    RunRecorder::new(dir.clone())
        .on_success(&TaskSignature::new("D", &d_cmd), &d_cmd, chrono::Local::now())
        .unwrap();

    let catalog = ScheduleBuilder::new()
        .with_task(TaskBuilder::new("A", "sh", "a.sh").build())
        .with_task(TaskBuilder::new("B", "sh", "b.sh").build())
        .with_task(TaskBuilder::new("C", "sh", "c.sh").build())
        .with_task(TaskBuilder::new("D", "sh", "d.sh").min_wait_min(60.0).build())
        .with_task(TaskBuilder::new("E", "sh", "e.sh").build())
        .with_task(TaskBuilder::new("F", "sh", "f.sh").build())
        .build();
    let interval = Duration::from_secs(600);
    let opts = SchedulerOptions {
        interval_wait: interval,
        ..options(100)
    };
    let executor = FakeExecutor::new();
    let mut scheduler = SchedulerLoop::new(dir, executor.clone(), opts);

    let started = tokio::time::Instant::now();
    let report = scheduler.run(&catalog).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(executor.executed_scripts(), vec!["a.sh", "c.sh", "e.sh"]);
    assert_eq!(report.skipped(), 3);
    // One pause before C and one before E; none for skips or after E.
    assert!(elapsed >= interval * 2, "elapsed {:?}", elapsed);
    assert!(elapsed < interval * 3, "elapsed {:?}", elapsed);
}
