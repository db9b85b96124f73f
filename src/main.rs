// src/main.rs

use tracing::Instrument;

use autosched::config::Directories;
use autosched::{cli, logging, run_scheduler};

/// Batch name shared by every scheduler invocation's log files and spans.
const BATCH: &str = "AUTOSCHED_JOB_SCHEDULER";
const PROGRAM: &str = "scheduler";

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("autosched error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let dirs = Directories::from_env();
    let _log_guard = logging::init_logging(
        args.log_level,
        dirs.util_logs.as_deref(),
        &logging::file_prefix(BATCH, PROGRAM),
    )?;

    run_scheduler(args, &dirs)
        .instrument(logging::session_span(BATCH, PROGRAM))
        .await?;
    Ok(())
}
