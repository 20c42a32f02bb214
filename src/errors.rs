//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Caller violated a precondition (no command given, run/stop before start).
    Usage(String),
    /// Session timed out waiting for the completion sentinel.
    Timeout(String),
    /// Shell process spawn, I/O, or signalling failure.
    Session(String),
    /// Grading workspace allocation or copy failure.
    Workspace(String),
    /// Patch did not apply cleanly to the workspace.
    Patch(String),
    /// Build/test invocation failed to execute at all.
    Grading(String),
    /// Grade validation failure (weights, subscore bounds, key sets).
    Score(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Usage(msg) => write!(f, "usage: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Session(msg) => write!(f, "session: {msg}"),
            Self::Workspace(msg) => write!(f, "workspace: {msg}"),
            Self::Patch(msg) => write!(f, "patch: {msg}"),
            Self::Grading(msg) => write!(f, "grading: {msg}"),
            Self::Score(msg) => write!(f, "score: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
