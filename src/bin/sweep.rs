// src/bin/sweep.rs

use autosched::config::Directories;
use autosched::{cli, logging, run_sweep};

const BATCH: &str = "AUTOSCHED_MAINT";
const PROGRAM: &str = "sweep";

fn main() {
    if let Err(err) = run_main() {
        eprintln!("autosched-sweep error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse_sweep();
    let dirs = Directories::from_env();
    let _log_guard = logging::init_logging(
        args.log_level,
        dirs.util_logs.as_deref(),
        &logging::file_prefix(BATCH, PROGRAM),
    )?;

    logging::session_span(BATCH, PROGRAM).in_scope(|| run_sweep(args, &dirs))?;
    Ok(())
}
