//! Error types for the workflow engine.
//!
//! - [`NodeError`]: errors raised during individual node execution.
//! - [`WorkflowError`]: top-level errors for validation, dispatch, and persistence.

pub mod node_error;
pub mod workflow_error;

pub use node_error::NodeError;
pub use workflow_error::WorkflowError;

/// Convenience alias for workflow-level results.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
/// Convenience alias for node-level results.
pub type NodeResult<T> = Result<T, NodeError>;
