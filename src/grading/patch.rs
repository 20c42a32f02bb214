//! Patch application via the external `git apply` primitive.
//!
//! Patch-format handling is deliberately not implemented in-process:
//! `git apply` is atomic — it either applies the whole diff or leaves the
//! working tree unchanged — so a failure is binary and fatal to the run.

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use crate::{AppError, Result};

/// Apply the unified diff at `patch_file` to the workspace working tree.
///
/// # Errors
///
/// Returns `AppError::Patch` if the patch file cannot be read, `git apply`
/// cannot be run, or the patch does not apply cleanly (git's stderr is
/// embedded in the message).
pub async fn apply_patch(workspace: &Path, patch_file: &Path) -> Result<()> {
    let patch = std::fs::read(patch_file).map_err(|err| {
        AppError::Patch(format!(
            "failed to read patch {}: {err}",
            patch_file.display()
        ))
    })?;

    let mut child = Command::new("git")
        .args(["apply", "-"])
        .current_dir(workspace)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| AppError::Patch(format!("failed to run git apply: {err}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(&patch)
            .await
            .map_err(|err| AppError::Patch(format!("failed to feed patch to git: {err}")))?;
        // Closing stdin signals end of the patch stream.
        drop(stdin);
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|err| AppError::Patch(format!("git apply did not complete: {err}")))?;

    if !output.status.success() {
        return Err(AppError::Patch(format!(
            "patch {} did not apply: {}",
            patch_file.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    info!(patch = %patch_file.display(), workspace = %workspace.display(), "patch applied");
    Ok(())
}

/// Hard-reset the workspace working tree to its committed baseline,
/// discarding every applied patch.
///
/// # Errors
///
/// Returns `AppError::Workspace` if `git reset --hard` cannot be run or
/// exits nonzero.
pub async fn reset_hard(workspace: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["reset", "--hard"])
        .current_dir(workspace)
        .output()
        .await
        .map_err(|err| AppError::Workspace(format!("failed to run git reset: {err}")))?;

    if !output.status.success() {
        return Err(AppError::Workspace(format!(
            "git reset --hard failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    info!(workspace = %workspace.display(), "workspace reset to baseline");
    Ok(())
}
