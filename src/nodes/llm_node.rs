//! The llm node executor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{ExecutionContext, NodeResultMap};
use crate::error::{NodeError, NodeResult};
use crate::graph::Node;
use crate::llm::{ChatCompletionClient, ChatRequest};

use super::executor::NodeExecutor;

/// Runs one chat completion per node execution.
///
/// The prompt is read from `user_prompt`, falling back to the legacy `prompt`
/// key. Placeholders are resolved in both prompts before the call.
pub struct LlmNodeExecutor {
    chat: Arc<dyn ChatCompletionClient>,
}

impl LlmNodeExecutor {
    pub fn new(chat: Arc<dyn ChatCompletionClient>) -> Self {
        LlmNodeExecutor { chat }
    }
}

#[async_trait]
impl NodeExecutor for LlmNodeExecutor {
    fn node_type(&self) -> &str {
        "llm"
    }

    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
        let raw_prompt = node
            .data
            .get("user_prompt")
            .or_else(|| node.data.get("prompt"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let user_prompt = ctx.resolve(raw_prompt);
        if user_prompt.trim().is_empty() {
            return Err(NodeError::ConfigError(format!(
                "llm node '{}' has an empty prompt",
                node.id
            )));
        }

        let system_prompt = node
            .data
            .get("system_prompt")
            .and_then(Value::as_str)
            .map(|p| ctx.resolve(p));

        debug!(node_id = %node.id, "requesting chat completion");
        let response = self
            .chat
            .chat(ChatRequest {
                system_prompt,
                user_prompt,
                tools: Vec::new(),
                model_config: node.data.clone(),
            })
            .await?;

        let mut data = Map::new();
        data.insert("response".to_string(), response.content.clone().into());
        data.insert("role".to_string(), response.role.into());

        let mut result = Map::new();
        result.insert("output".to_string(), response.content.clone().into());
        result.insert("content".to_string(), response.content.into());
        result.insert("data".to_string(), Value::Object(data));
        Ok(result)
    }
}
