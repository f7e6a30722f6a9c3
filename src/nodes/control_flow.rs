//! Start and end node executors.

use async_trait::async_trait;
use serde_json::Map;

use crate::core::{ExecutionContext, NodeResultMap};
use crate::error::NodeResult;
use crate::graph::Node;

use super::executor::NodeExecutor;

/// Entry marker. Echoes the run's input parameters into the variable pool so
/// downstream nodes can reference them without the `input.` prefix.
pub struct StartNodeExecutor;

#[async_trait]
impl NodeExecutor for StartNodeExecutor {
    fn node_type(&self) -> &str {
        "start"
    }

    async fn execute(&self, _node: &Node, ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
        let mut result = Map::new();
        result.insert("output".to_string(), "Workflow started".into());
        for (key, value) in ctx.input_params() {
            result.insert(key.clone(), value.clone());
        }
        Ok(result)
    }
}

/// Exit marker. Produces a fixed output; reaching it ends the run.
pub struct EndNodeExecutor;

#[async_trait]
impl NodeExecutor for EndNodeExecutor {
    fn node_type(&self) -> &str {
        "end"
    }

    async fn execute(&self, _node: &Node, _ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
        let mut result = Map::new();
        result.insert("output".to_string(), "Workflow finished".into());
        Ok(result)
    }
}
