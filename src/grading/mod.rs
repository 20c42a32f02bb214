//! Deterministic grading pipeline: isolated workspaces, patch application,
//! build/test stage sequencing, and report rendering.

pub mod command;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod workspace;

pub use pipeline::GradingPipeline;
pub use workspace::GradingWorkspace;
