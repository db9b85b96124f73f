// tests/process_executor.rs

use std::ffi::OsString;

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;

use autosched::cli::SchedulerArgs;
use autosched::config::Directories;
use autosched::engine::Disposition;
use autosched::exec::{run_command, TaskOutcome};
use autosched::run_scheduler;
use autosched::task::CommandLine;
use autosched_test_utils::{init_tracing, with_timeout};

fn sh(script: &str) -> CommandLine {
    CommandLine::new(vec!["sh".into(), "-c".into(), script.into()])
}

#[tokio::test]
async fn zero_exit_is_success() {
    init_tracing();
    let outcome = with_timeout(run_command(&sh("echo out; echo err >&2; exit 0"))).await;
    assert_eq!(outcome, TaskOutcome::Success);
}

#[tokio::test]
async fn non_zero_exit_code_is_reported() {
    init_tracing();
    let outcome = with_timeout(run_command(&sh("exit 3"))).await;
    assert_eq!(outcome, TaskOutcome::Failed(3));
}

#[tokio::test]
async fn killed_child_reports_minus_one() {
    init_tracing();
    let outcome = with_timeout(run_command(&sh("kill -9 $$"))).await;
    assert_eq!(outcome, TaskOutcome::Failed(-1));
}

#[tokio::test]
async fn invalid_utf8_output_does_not_change_the_outcome() {
    init_tracing();
    // The child keeps writing after the undecodable line; a closed pipe would
    // turn this into a SIGPIPE exit.
    let script = "printf '\\377\\n'; printf '\\377\\n' >&2; sleep 0.2; \
                  i=0; while [ $i -lt 2000 ]; do echo line $i; i=$((i+1)); done; exit 0";
    let outcome = with_timeout(run_command(&sh(script))).await;
    assert_eq!(outcome, TaskOutcome::Success);
}

#[tokio::test]
async fn missing_interpreter_is_a_host_error() {
    init_tracing();
    let cmd = CommandLine::new(vec![
        "/definitely/not/an/interpreter".into(),
        "job.py".into(),
    ]);
    let outcome = with_timeout(run_command(&cmd)).await;
    match outcome {
        TaskOutcome::Error(msg) => assert!(msg.contains("spawning process")),
        other => panic!("expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_command_line_is_a_host_error() {
    init_tracing();
    let outcome = with_timeout(run_command(&CommandLine::new(Vec::new()))).await;
    assert!(matches!(outcome, TaskOutcome::Error(_)));
}

#[tokio::test]
async fn schedule_file_end_to_end() {
    init_tracing();
    let work = TempDir::new().unwrap();
    let locks = TempDir::new().unwrap();

    std::fs::write(
        work.path().join("touch.sh"),
        "echo \"writing $1\"\nprintf done > \"$1\"\n",
    )
    .unwrap();
    let schedule = json!({
        "base_paths": { "out": work.path().to_str().unwrap() },
        "tasks": [
            {
                "automation_id": "TOUCH",
                "schedule": "active",
                "script_path": "{out}/touch.sh",
                "interpreter": "sh",
                "arguments": { "arg_1": "{out}/marker.txt" },
                "min_wait_min": 10
            },
            {
                "automation_id": "FAIL",
                "schedule": "active",
                "script_path": "-c",
                "interpreter": "sh",
                "arguments": ["exit 4"],
                "min_wait_min": 0
            },
            {
                "automation_id": "PAUSED",
                "schedule": "inactive",
                "script_path": "{out}/touch.sh",
                "interpreter": "sh",
                "arguments": {}
            }
        ]
    });
    let schedule_path = work.path().join("schedule.json");
    std::fs::write(&schedule_path, schedule.to_string()).unwrap();

    let args = SchedulerArgs::try_parse_from([
        OsString::from("autosched"),
        schedule_path.clone().into_os_string(),
        OsString::from("--locks-dir"),
        locks.path().as_os_str().to_owned(),
        OsString::from("--interval_wait=0"),
    ])
    .unwrap();

    let report = with_timeout(run_scheduler(args, &Directories::default()))
        .await
        .unwrap();

    assert_eq!(report.tasks.len(), 2);
    assert_eq!(
        report.find("TOUCH").unwrap().disposition,
        Disposition::Attempted(TaskOutcome::Success)
    );
    assert_eq!(
        report.find("FAIL").unwrap().disposition,
        Disposition::Attempted(TaskOutcome::Failed(4))
    );
    assert_eq!(
        std::fs::read_to_string(work.path().join("marker.txt")).unwrap(),
        "done"
    );

    let touch = &report.find("TOUCH").unwrap().signature;
    let lastrun = std::fs::read_to_string(locks.path().join(touch.lastrun_file_name())).unwrap();
    let expected_cmd = format!(
        "sh {0}/touch.sh {0}/marker.txt",
        work.path().display()
    );
    assert_eq!(lastrun.lines().next(), Some(expected_cmd.as_str()));
    assert_eq!(lastrun.lines().count(), 2);
}
