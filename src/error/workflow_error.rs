//! Workflow-level error types.

use super::NodeError;
use thiserror::Error;

/// Workflow-level errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),
    #[error("Workflow definition must contain at least one node")]
    EmptyDefinition,
    #[error("Node id must not be empty")]
    EmptyNodeId,
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),
    #[error("Edge '{edge_id}' references missing node: {node_id}")]
    DanglingEdge { edge_id: String, node_id: String },
    #[error("Node cannot connect to itself: {0}")]
    SelfLoop(String),
    #[error("No entry node found (every node has an incoming edge)")]
    NoEntryNode,
    #[error("No exit node found (every node has an outgoing edge)")]
    NoExitNode,
    #[error("Cycle detected in graph")]
    CycleDetected,
    #[error("Unreachable node: {0}")]
    UnreachableNode(String),
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Node executor not found for type: {0}")]
    ExecutorNotFound(String),
    #[error("Node execution error: node={node_id}, error={error}")]
    NodeExecutionError { node_id: String, error: String },
    #[error("Execution not found: {0}")]
    ExecutionNotFound(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WorkflowError {
    pub fn node_execution(node_id: impl Into<String>, error: &NodeError) -> Self {
        WorkflowError::NodeExecutionError {
            node_id: node_id.into(),
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_display() {
        assert_eq!(
            WorkflowError::WorkflowNotFound("wf1".into()).to_string(),
            "Workflow not found: wf1"
        );
        assert_eq!(
            WorkflowError::DuplicateNodeId("n".into()).to_string(),
            "Duplicate node id: n"
        );
        assert_eq!(
            WorkflowError::DanglingEdge {
                edge_id: "e1".into(),
                node_id: "ghost".into()
            }
            .to_string(),
            "Edge 'e1' references missing node: ghost"
        );
        assert_eq!(
            WorkflowError::SelfLoop("a".into()).to_string(),
            "Node cannot connect to itself: a"
        );
        assert_eq!(
            WorkflowError::CycleDetected.to_string(),
            "Cycle detected in graph"
        );
        assert_eq!(
            WorkflowError::UnreachableNode("island".into()).to_string(),
            "Unreachable node: island"
        );
        assert_eq!(
            WorkflowError::ExecutorNotFound("magic".into()).to_string(),
            "Node executor not found for type: magic"
        );
    }

    #[test]
    fn test_node_execution_error_names_node() {
        let err = WorkflowError::node_execution(
            "http1",
            &NodeError::HttpError("connection refused".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("http1"));
        assert!(msg.contains("connection refused"));
    }
}
