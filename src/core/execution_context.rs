//! Mutable per-run execution state.
//!
//! One [`ExecutionContext`] exists per run and is never shared across runs.
//! It carries the read-only input parameters, per-node results and statuses,
//! the flattened variable pool used for `{placeholder}` substitution, and an
//! ordered execution log. Discarded once the engine finalizes the record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::execution::NodeStatus;
use crate::graph::{Edge, Node, WorkflowDefinition};
use crate::template;

/// The result map produced by one node execution.
pub type NodeResultMap = Map<String, Value>;

/// A timestamped execution log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Mutable state for a single workflow run.
pub struct ExecutionContext {
    definition: Arc<WorkflowDefinition>,
    input_params: Map<String, Value>,
    execution_results: HashMap<String, NodeResultMap>,
    node_statuses: HashMap<String, NodeStatus>,
    context_data: Map<String, Value>,
    log: Vec<LogEntry>,
    user_id: String,
    execution_id: String,
}

impl ExecutionContext {
    /// Build the context for one run; `context_data` starts as a shallow copy
    /// of the input parameters and every node starts `pending`.
    pub fn new(
        definition: Arc<WorkflowDefinition>,
        input_params: Map<String, Value>,
        user_id: String,
        execution_id: String,
    ) -> Self {
        let node_statuses = definition
            .nodes
            .iter()
            .map(|n| (n.id.clone(), NodeStatus::Pending))
            .collect();
        let context_data = input_params.clone();
        ExecutionContext {
            definition,
            input_params,
            execution_results: HashMap::new(),
            node_statuses,
            context_data,
            log: Vec::new(),
            user_id,
            execution_id,
        }
    }

    /// Store a node's full result and merge its top-level keys into the
    /// flattened variable pool. Later writes win on key collision.
    pub fn add_node_result(&mut self, node_id: &str, result: NodeResultMap) {
        for (key, value) in &result {
            self.context_data.insert(key.clone(), value.clone());
        }
        self.execution_results.insert(node_id.to_string(), result);
    }

    /// Set a node's status. Transitions out of a terminal state are refused.
    pub fn set_status(&mut self, node_id: &str, status: NodeStatus) {
        match self.node_statuses.get(node_id) {
            Some(current) if current.is_terminal() => {
                warn!(
                    node_id,
                    current = %current,
                    requested = %status,
                    "ignoring status transition out of terminal state"
                );
            }
            _ => {
                self.node_statuses.insert(node_id.to_string(), status);
            }
        }
    }

    pub fn status(&self, node_id: &str) -> NodeStatus {
        self.node_statuses
            .get(node_id)
            .copied()
            .unwrap_or(NodeStatus::Pending)
    }

    pub fn node_by_id(&self, node_id: &str) -> Option<&Node> {
        self.definition.node_by_id(node_id)
    }

    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.definition.outgoing_edges(node_id)
    }

    pub fn incoming_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.definition.incoming_edges(node_id)
    }

    /// Append a timestamped entry to the run log.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(execution_id = %self.execution_id, "{message}");
        self.log.push(LogEntry {
            at: Utc::now(),
            message,
        });
    }

    /// Substitute `{placeholder}` tokens against this run's state.
    pub fn resolve(&self, text: &str) -> String {
        template::resolve_placeholders(text, self)
    }

    pub fn input_params(&self) -> &Map<String, Value> {
        &self.input_params
    }

    pub fn context_data(&self) -> &Map<String, Value> {
        &self.context_data
    }

    pub fn node_result(&self, node_id: &str) -> Option<&NodeResultMap> {
        self.execution_results.get(node_id)
    }

    pub fn execution_results(&self) -> &HashMap<String, NodeResultMap> {
        &self.execution_results
    }

    /// All accumulated node results as a single JSON object keyed by node id.
    pub fn results_as_value(&self) -> Value {
        let mut out = Map::new();
        for (node_id, result) in &self.execution_results {
            out.insert(node_id.clone(), Value::Object(result.clone()));
        }
        Value::Object(out)
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }
}
