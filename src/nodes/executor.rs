//! The node executor trait and type-keyed registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::warn;

use crate::core::{ExecutionContext, HttpTransport, NodeResultMap};
use crate::error::NodeResult;
use crate::graph::Node;
use crate::knowledge::KnowledgeRetrievalClient;
use crate::llm::ChatCompletionClient;

use super::control_flow::{EndNodeExecutor, StartNodeExecutor};
use super::http::HttpNodeExecutor;
use super::intent::IntentRecognitionExecutor;
use super::knowledge::KnowledgeRetrievalExecutor;
use super::llm_node::LlmNodeExecutor;

/// One node-type handler. Implementations read the node's `data` map and the
/// run's context; they never mutate the context themselves.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// The node type string this executor handles.
    fn node_type(&self) -> &str;

    /// Execute one node and return its result map.
    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> NodeResult<NodeResultMap>;
}

/// Maps node type strings to executors. Registration is last-wins; the same
/// executor may be registered under an alias type string.
#[derive(Default)]
pub struct NodeExecutorRegistry {
    executors: RwLock<HashMap<String, Arc<dyn NodeExecutor>>>,
}

impl NodeExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under its own declared type.
    pub fn register(&self, executor: Arc<dyn NodeExecutor>) {
        let node_type = executor.node_type().to_string();
        let mut executors = self.executors.write();
        if executors.contains_key(&node_type) {
            warn!(node_type, "replacing previously registered executor");
        }
        executors.insert(node_type, executor);
    }

    /// Register an executor under an additional type string.
    pub fn register_alias(&self, alias: &str, executor: Arc<dyn NodeExecutor>) {
        let mut executors = self.executors.write();
        if executors.contains_key(alias) {
            warn!(node_type = alias, "replacing previously registered executor");
        }
        executors.insert(alias.to_string(), executor);
    }

    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.read().get(node_type).cloned()
    }

    /// Registered type strings, sorted for stable output.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.executors.read().keys().cloned().collect();
        types.sort();
        types
    }
}

/// Build a registry with every built-in executor wired to the given
/// collaborators. The llm executor also answers for the legacy `agent` type.
pub fn default_registry(
    chat: Arc<dyn ChatCompletionClient>,
    retrieval: Arc<dyn KnowledgeRetrievalClient>,
    transport: Arc<dyn HttpTransport>,
) -> NodeExecutorRegistry {
    let registry = NodeExecutorRegistry::new();
    registry.register(Arc::new(StartNodeExecutor));
    registry.register(Arc::new(EndNodeExecutor));
    registry.register(Arc::new(HttpNodeExecutor::new(transport)));
    let llm = Arc::new(LlmNodeExecutor::new(chat.clone()));
    registry.register(llm.clone());
    registry.register_alias("agent", llm);
    registry.register(Arc::new(IntentRecognitionExecutor::new(chat)));
    registry.register(Arc::new(KnowledgeRetrievalExecutor::new(retrieval)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    struct FixedExecutor {
        node_type: &'static str,
        marker: &'static str,
    }

    #[async_trait]
    impl NodeExecutor for FixedExecutor {
        fn node_type(&self) -> &str {
            self.node_type
        }

        async fn execute(&self, _node: &Node, _ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
            let mut result = Map::new();
            result.insert("marker".to_string(), self.marker.into());
            Ok(result)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = NodeExecutorRegistry::new();
        registry.register(Arc::new(FixedExecutor {
            node_type: "custom",
            marker: "a",
        }));

        assert!(registry.get("custom").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = NodeExecutorRegistry::new();
        registry.register(Arc::new(FixedExecutor {
            node_type: "custom",
            marker: "first",
        }));
        registry.register(Arc::new(FixedExecutor {
            node_type: "custom",
            marker: "second",
        }));

        assert_eq!(registry.registered_types(), vec!["custom"]);
    }

    #[test]
    fn test_alias_shares_executor() {
        let registry = NodeExecutorRegistry::new();
        let executor = Arc::new(FixedExecutor {
            node_type: "llm",
            marker: "a",
        });
        registry.register(executor.clone());
        registry.register_alias("agent", executor);

        assert_eq!(registry.registered_types(), vec!["agent", "llm"]);
        assert_eq!(registry.get("agent").unwrap().node_type(), "llm");
    }
}
