use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed unit of work in a workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Node id, unique within the definition.
    pub id: String,

    /// Node type (start, end, http, llm, intent_recognition, knowledge_retrieval, ...).
    #[serde(rename = "type")]
    pub node_type: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Type-specific configuration. Values may contain `{placeholder}` tokens.
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// A directed connection between two nodes, optionally guarded by a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,

    /// Source node id.
    pub source: String,

    /// Target node id.
    pub target: String,

    /// Optional guard of the form `variable == 'literal'`.
    #[serde(default)]
    pub condition: Option<String>,
}

/// A workflow definition: the node/edge graph a run executes.
///
/// Immutable once validated for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl WorkflowDefinition {
    pub fn node_by_id(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == node_id).collect()
    }

    pub fn incoming_edges(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target == node_id).collect()
    }

    /// Node ids with no incoming edge.
    pub fn entry_node_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.target == n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Node ids with no outgoing edge.
    pub fn exit_node_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.source == n.id))
            .map(|n| n.id.as_str())
            .collect()
    }
}
