//! Domain model module declarations.

pub mod grade;
pub mod stage;
pub mod tool_result;

pub use grade::Grade;
pub use stage::{GradingOutcome, StageResult};
pub use tool_result::ToolResult;
