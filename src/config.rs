//! Harness configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Interactive shell session settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Shell command started for the session.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Interval between output-buffer polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Hard per-command timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Maximum bytes of stdout/stderr embedded inline in a timeout error.
    #[serde(default = "default_preview_limit_bytes")]
    pub preview_limit_bytes: usize,
    /// Unprivileged uid the shell is demoted to at spawn. Demotion is
    /// always on for config-driven sessions; the harness runs as root.
    #[serde(default = "default_run_as_id")]
    pub run_as_uid: u32,
    /// Unprivileged gid the shell is demoted to at spawn.
    #[serde(default = "default_run_as_id")]
    pub run_as_gid: u32,
}

fn default_shell() -> String {
    "/bin/bash".into()
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_preview_limit_bytes() -> usize {
    10_000
}

fn default_run_as_id() -> u32 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_seconds: default_timeout_seconds(),
            preview_limit_bytes: default_preview_limit_bytes(),
            run_as_uid: default_run_as_id(),
            run_as_gid: default_run_as_id(),
        }
    }
}

/// Grading pipeline settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GradingConfig {
    /// Baseline repository copied into each workspace. Must be a committed
    /// git repository so patches can be applied and hard-reset.
    pub baseline_repo: PathBuf,
    /// Path to the test patch (unified diff).
    pub test_patch: PathBuf,
    /// Path to the golden patch (unified diff).
    pub golden_patch: PathBuf,
    /// Build command, run via `/bin/sh -lc` in the workspace.
    pub build_command: String,
    /// Test command, run via `/bin/sh -lc` in the workspace.
    pub test_command: String,
    /// Directory under which uniquely named workspaces are allocated.
    #[serde(default = "default_workspace_parent")]
    pub workspace_parent: PathBuf,
    /// Upper bound on a single build/test invocation, in seconds.
    #[serde(default = "default_build_timeout_seconds")]
    pub build_timeout_seconds: u64,
}

fn default_workspace_parent() -> PathBuf {
    std::env::temp_dir()
}

fn default_build_timeout_seconds() -> u64 {
    1500
}

impl GradingConfig {
    /// Build timeout as a [`Duration`].
    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_seconds)
    }
}

/// Top-level configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct HarnessConfig {
    /// Interactive session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Grading pipeline settings.
    pub grading: GradingConfig,
}

impl HarnessConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "session.poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.session.timeout_seconds == 0 {
            return Err(AppError::Config(
                "session.timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.session.shell.trim().is_empty() {
            return Err(AppError::Config("session.shell must not be empty".into()));
        }
        if self.grading.build_command.trim().is_empty() {
            return Err(AppError::Config(
                "grading.build_command must not be empty".into(),
            ));
        }
        if self.grading.test_command.trim().is_empty() {
            return Err(AppError::Config(
                "grading.test_command must not be empty".into(),
            ));
        }
        Ok(())
    }
}
