//! Build/test command invocation.
//!
//! Commands run via `/bin/sh -lc` in the workspace. Exit code zero means
//! success; no other interpretation is applied. The streaming variant
//! drains stdout and stderr with two independently progressing readers —
//! draining only one risks deadlocking the child when the other pipe's
//! buffer fills.

use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::info;

use crate::{AppError, Result};

/// Captured result of one external command.
#[derive(Debug)]
pub struct CommandOutput {
    /// Whether the command exited with code zero.
    pub success: bool,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

/// Run a command to completion, capturing both streams.
///
/// # Errors
///
/// Returns `AppError::Grading` if the command cannot be run or does not
/// finish within `timeout`.
pub async fn run_captured(
    command: &str,
    workspace: &Path,
    timeout: Duration,
) -> Result<CommandOutput> {
    let output = tokio::time::timeout(
        timeout,
        Command::new("/bin/sh")
            .args(["-lc", command])
            .current_dir(workspace)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| {
        AppError::Grading(format!(
            "command `{command}` did not finish within {}s",
            timeout.as_secs()
        ))
    })?
    .map_err(|err| AppError::Grading(format!("failed to run `{command}`: {err}")))?;

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command while forwarding its output live, line by line, and
/// accumulating a single combined transcript.
///
/// # Errors
///
/// Returns `AppError::Grading` if the command cannot be run or does not
/// finish within `timeout`.
pub async fn run_streaming(
    command: &str,
    workspace: &Path,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut child = Command::new("/bin/sh")
        .args(["-lc", command])
        .current_dir(workspace)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| AppError::Grading(format!("failed to run `{command}`: {err}")))?;

    let transcript = Arc::new(Mutex::new(String::new()));

    let stdout_task = child
        .stdout
        .take()
        .map(|stream| stream_lines(stream, Arc::clone(&transcript), "stdout"));
    let stderr_task = child
        .stderr
        .take()
        .map(|stream| stream_lines(stream, Arc::clone(&transcript), "stderr"));

    let status = tokio::time::timeout(timeout, async {
        if let Some(task) = stdout_task {
            let _ = task.await;
        }
        if let Some(task) = stderr_task {
            let _ = task.await;
        }
        child.wait().await
    })
    .await
    .map_err(|_| {
        AppError::Grading(format!(
            "command `{command}` did not finish within {}s",
            timeout.as_secs()
        ))
    })?
    .map_err(|err| AppError::Grading(format!("`{command}` did not complete: {err}")))?;

    let combined = std::mem::take(
        &mut *transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
    );

    Ok(CommandOutput {
        success: status.success(),
        stdout: combined,
        stderr: String::new(),
    })
}

/// Spawn a reader task forwarding each line via tracing while appending it
/// to the shared transcript.
fn stream_lines<R>(
    stream: R,
    transcript: Arc<Mutex<String>>,
    label: &'static str,
) -> tokio::task::JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: "evalbox::build", stream = label, "{line}");
            let mut guard = transcript.lock().unwrap_or_else(PoisonError::into_inner);
            guard.push_str(&line);
            guard.push('\n');
        }
    })
}
