//! Isolated grading workspaces.

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{AppError, Result};

/// Uniquely named copy of the baseline repository.
///
/// One workspace per grading or validation invocation, never reused and
/// never shared: the generated identifier is the only handle to it, which
/// keeps concurrent runs from interfering. The core imposes no cleanup
/// contract; retention is a collaborator concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingWorkspace {
    id: String,
    path: PathBuf,
}

impl GradingWorkspace {
    /// Allocate a fresh workspace under `parent`, seeded by a recursive
    /// copy of `baseline`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Workspace` if the baseline cannot be walked or
    /// any entry cannot be copied.
    pub fn create(baseline: &Path, parent: &Path) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let path = parent.join(format!("grading_workspace_{id}"));

        copy_tree(baseline, &path)?;
        info!(workspace = %path.display(), baseline = %baseline.display(), "workspace created");

        Ok(Self { id, path })
    }

    /// Generated workspace identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root directory of the workspace copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Recursively copy `src` into `dst`, preserving directory structure.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry =
            entry.map_err(|err| AppError::Workspace(format!("failed to walk baseline: {err}")))?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| AppError::Workspace(format!("path outside baseline: {err}")))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|err| {
                AppError::Workspace(format!(
                    "failed to create {}: {err}",
                    target.display()
                ))
            })?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|err| {
                AppError::Workspace(format!(
                    "failed to copy {} to {}: {err}",
                    entry.path().display(),
                    target.display()
                ))
            })?;
        }
    }

    Ok(())
}
