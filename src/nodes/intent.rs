//! The intent_recognition node executor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::{ExecutionContext, NodeResultMap};
use crate::error::{NodeError, NodeResult};
use crate::graph::Node;
use crate::llm::{ChatCompletionClient, ChatRequest};

use super::executor::NodeExecutor;

const DEFAULT_INTENT: &str = "default";

/// Classifies a text into one of the configured intents via a chat model.
///
/// Misconfiguration (no text, no intents) fails the node; a model failure or
/// an answer matching no intent falls back to the `default` intent so the
/// graph can route through a catch-all branch.
pub struct IntentRecognitionExecutor {
    chat: Arc<dyn ChatCompletionClient>,
}

impl IntentRecognitionExecutor {
    pub fn new(chat: Arc<dyn ChatCompletionClient>) -> Self {
        IntentRecognitionExecutor { chat }
    }

    fn intent_names(node: &Node) -> NodeResult<Vec<(String, String)>> {
        let raw = node
            .data
            .get("intents")
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| {
                NodeError::ConfigError(format!(
                    "intent_recognition node '{}' has no intents",
                    node.id
                ))
            })?;

        let mut intents = Vec::new();
        for entry in raw {
            match entry {
                Value::String(name) => intents.push((name.clone(), String::new())),
                Value::Object(obj) => {
                    if let Some(name) = obj.get("name").and_then(Value::as_str) {
                        let description = obj
                            .get("description")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string();
                        intents.push((name.to_string(), description));
                    }
                }
                other => warn!(node_id = %node.id, ?other, "skipping malformed intent entry"),
            }
        }
        if intents.is_empty() {
            return Err(NodeError::ConfigError(format!(
                "intent_recognition node '{}' has no usable intents",
                node.id
            )));
        }
        Ok(intents)
    }

    fn build_prompt(text: &str, intents: &[(String, String)]) -> String {
        let mut lines = String::from("Classify the user text into exactly one intent.\n\nIntents:\n");
        for (name, description) in intents {
            if description.is_empty() {
                lines.push_str(&format!("- {name}\n"));
            } else {
                lines.push_str(&format!("- {name}: {description}\n"));
            }
        }
        lines.push_str(&format!(
            "\nUser text: {text}\n\nRespond with only the intent name."
        ));
        lines
    }

    /// Strip model decoration (whitespace, newlines, quotes, backticks, and
    /// trailing punctuation) from the raw answer.
    fn clean_answer(raw: &str) -> String {
        let mut cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect();
        cleaned = cleaned
            .trim_matches(|c| c == '\'' || c == '"' || c == '`')
            .to_string();
        cleaned
            .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .to_string()
    }

    fn match_intent(answer: &str, intents: &[(String, String)]) -> Option<String> {
        let cleaned = Self::clean_answer(answer);
        for (name, _) in intents {
            if cleaned.eq_ignore_ascii_case(name) {
                return Some(name.clone());
            }
        }
        for (name, _) in intents {
            if cleaned.to_lowercase().contains(&name.to_lowercase()) {
                return Some(name.clone());
            }
        }
        None
    }
}

#[async_trait]
impl NodeExecutor for IntentRecognitionExecutor {
    fn node_type(&self) -> &str {
        "intent_recognition"
    }

    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
        let raw_text = node
            .data
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("");
        let text = ctx.resolve(raw_text);
        if text.trim().is_empty() {
            return Err(NodeError::ConfigError(format!(
                "intent_recognition node '{}' has no text to classify",
                node.id
            )));
        }

        let intents = Self::intent_names(node)?;

        let mut model_config = Map::new();
        if let Some(model) = node.data.get("model") {
            model_config.insert("model".to_string(), model.clone());
        }

        let request = ChatRequest {
            system_prompt: None,
            user_prompt: Self::build_prompt(&text, &intents),
            tools: Vec::new(),
            model_config,
        };

        let mut result = Map::new();
        match self.chat.chat(request).await {
            Ok(response) => {
                let cleaned = Self::clean_answer(&response.content);
                match Self::match_intent(&response.content, &intents) {
                    Some(intent) => {
                        debug!(node_id = %node.id, %intent, "intent recognized");
                        result.insert("intent".to_string(), intent.into());
                    }
                    None => {
                        warn!(
                            node_id = %node.id,
                            answer = %response.content,
                            "answer matched no configured intent, using default"
                        );
                        result.insert("intent".to_string(), DEFAULT_INTENT.into());
                    }
                }
                // the cleaned raw answer, kept next to the validated intent
                result.insert("match".to_string(), cleaned.into());
            }
            Err(e) => {
                warn!(node_id = %node.id, error = %e, "intent model call failed, using default");
                result.insert("intent".to_string(), DEFAULT_INTENT.into());
                result.insert("match".to_string(), Value::Null);
                result.insert("error".to_string(), e.to_string().into());
            }
        }
        Ok(result)
    }
}
