//! Tagged outcome record returned by interactive tool calls.

use serde::{Deserialize, Serialize};

/// Result of one interactive tool invocation.
///
/// Exactly one of the informational fields is meaningful per call: a
/// successful command run carries `output`/`error`, an operational note
/// (process exited, tool restarted) carries `system`, and screenshot-style
/// tools carry `base64_image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolResult {
    /// Captured stdout of the command, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Captured stderr of the command, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Operational note from the harness rather than the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Base64-encoded screenshot payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_image: Option<String>,
}

impl ToolResult {
    /// Successful command result carrying captured stdout and stderr.
    #[must_use]
    pub fn cli(output: String, error: String) -> Self {
        Self {
            output: Some(output),
            error: Some(error),
            ..Self::default()
        }
    }

    /// Operational note with no command output.
    #[must_use]
    pub fn system(note: impl Into<String>) -> Self {
        Self {
            system: Some(note.into()),
            ..Self::default()
        }
    }

    /// Operational note paired with an error description.
    #[must_use]
    pub fn system_with_error(note: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            system: Some(note.into()),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
