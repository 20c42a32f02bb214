//! Pipeline stage outcomes.

use serde::{Deserialize, Serialize};

/// Outcome of one named grading pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StageResult {
    /// Stage name (e.g. `BaselineCompiles`, `Tests`).
    pub name: String,
    /// Whether the stage's assertion held.
    pub passed: bool,
    /// Failure description when the assertion did not hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Captured stdout of the stage's external command.
    pub stdout: String,
    /// Captured stderr of the stage's external command.
    pub stderr: String,
}

impl StageResult {
    /// Passing stage with captured output.
    #[must_use]
    pub fn passed(name: impl Into<String>, stdout: String, stderr: String) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: None,
            stdout,
            stderr,
        }
    }

    /// Failing stage with a failure message and captured output.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        message: impl Into<String>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(message.into()),
            stdout,
            stderr,
        }
    }
}

/// Final result of a grading or validation workflow.
///
/// Built from the first failing [`StageResult`] or from all-pass. The
/// `failed_stage` name lets the harness distinguish which invariant broke
/// without parsing the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GradingOutcome {
    /// Whether every stage passed.
    pub passed: bool,
    /// JUnit-style XML report for the run.
    pub junit: String,
    /// Name of the first failing stage, when `passed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
}

impl GradingOutcome {
    /// All-pass outcome carrying the rendered report.
    #[must_use]
    pub fn success(junit: String) -> Self {
        Self {
            passed: true,
            junit,
            failed_stage: None,
        }
    }

    /// Short-circuited outcome for the given failing stage.
    #[must_use]
    pub fn failure(stage: &StageResult, junit: String) -> Self {
        Self {
            passed: false,
            junit,
            failed_stage: Some(stage.name.clone()),
        }
    }
}
