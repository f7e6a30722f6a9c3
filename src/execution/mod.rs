//! Execution records and status types.

pub mod record;
pub mod status;

pub use record::{ExecutionRecord, ExecutionResponse};
pub use status::{ExecutionStatus, NodeStatus};
