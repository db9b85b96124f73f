// src/exec/process.rs

//! Child process runner.

use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::exec::{ExecutorBackend, TaskOutcome};
use crate::task::CommandLine;

/// Runs `interpreter script arg...` directly (no shell) and waits for it.
///
/// There is no timeout: a child that never exits blocks the caller until the
/// scheduler itself is terminated. Stdout and stderr are forwarded line by
/// line into the current tracing span; their content is never interpreted.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorBackend for ProcessExecutor {
    fn run<'a>(
        &'a mut self,
        command: &'a CommandLine,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        Box::pin(run_command(command))
    }
}

/// Run a single command, mapping every failure mode onto [`TaskOutcome`].
pub async fn run_command(command: &CommandLine) -> TaskOutcome {
    match run_command_inner(command).await {
        Ok(status) if status.success() => TaskOutcome::Success,
        Ok(status) => TaskOutcome::Failed(status.code().unwrap_or(-1)),
        Err(err) => TaskOutcome::Error(format!("{err:#}")),
    }
}

async fn run_command_inner(command: &CommandLine) -> Result<ExitStatus> {
    let program = command
        .program()
        .context("command line is empty")?;

    debug!(cmd = %command, "starting task process");

    let mut child = Command::new(program)
        .args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning process '{}'", command))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Drain both pipes while waiting so a chatty child cannot fill a buffer
    // and stall.
    let (status, (), ()) = tokio::join!(
        child.wait(),
        forward_lines(stdout, OutputStream::Stdout),
        forward_lines(stderr, OutputStream::Stderr),
    );

    let status = status.with_context(|| format!("waiting for process '{}'", command))?;
    debug!(
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "task process exited"
    );
    Ok(status)
}

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Log every line the child writes until the pipe closes.
///
/// Bytes are decoded lossily and read errors end forwarding only at EOF, so
/// the read end stays open for as long as the child may write to it.
async fn forward_lines<R>(reader: Option<R>, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                match stream {
                    OutputStream::Stdout => info!("stdout: {}", line),
                    OutputStream::Stderr => warn!("stderr: {}", line),
                }
            }
            Err(e) => {
                debug!(?stream, error = %e, "reading task output failed");
                break;
            }
        }
    }
}
