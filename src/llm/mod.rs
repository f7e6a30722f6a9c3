//! Chat-completion collaborator interface.
//!
//! The llm and intent_recognition executors invoke a model through
//! [`ChatCompletionClient`]: one synchronous request, one response, no
//! streaming and no internal retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::NodeError;

/// Errors from the chat-completion collaborator.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<LlmError> for NodeError {
    fn from(e: LlmError) -> Self {
        NodeError::ModelError(e.to_string())
    }
}

/// One chat-completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    /// Tool definitions, unused by the built-in executors.
    #[serde(default)]
    pub tools: Vec<Value>,
    /// Node `data` forwarded as model configuration (model, temperature, ...).
    #[serde(default)]
    pub model_config: Map<String, Value>,
}

/// The single response message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub role: String,
}

/// Synchronous chat-completion collaborator.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_maps_to_node_error() {
        let err: NodeError = LlmError::ApiError("quota exceeded".into()).into();
        assert!(matches!(err, NodeError::ModelError(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
