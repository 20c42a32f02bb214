#![forbid(unsafe_code)]

//! Remote execution substrate for an agent-evaluation harness: an
//! interactive shell session with sentinel-based completion detection, and
//! a deterministic patch-grading pipeline over isolated workspace copies.

pub mod config;
pub mod errors;
pub mod grading;
pub mod models;
pub mod session;

pub use config::HarnessConfig;
pub use errors::{AppError, Result};
