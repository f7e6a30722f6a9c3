//! The knowledge_retrieval node executor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::{ExecutionContext, NodeResultMap};
use crate::error::{NodeError, NodeResult};
use crate::graph::Node;
use crate::knowledge::KnowledgeRetrievalClient;

use super::executor::NodeExecutor;

const DEFAULT_TOP_K: usize = 3;
const DEFAULT_MIN_SCORE: f64 = 0.0;

/// Retrieves ranked snippets from the configured knowledge bases.
///
/// `topK` and `minScore` are parsed leniently (number or numeric string) and
/// fall back to their defaults; the knowledge base id list must yield at
/// least one numeric id.
pub struct KnowledgeRetrievalExecutor {
    retrieval: Arc<dyn KnowledgeRetrievalClient>,
}

impl KnowledgeRetrievalExecutor {
    pub fn new(retrieval: Arc<dyn KnowledgeRetrievalClient>) -> Self {
        KnowledgeRetrievalExecutor { retrieval }
    }

    fn knowledge_base_ids(node: &Node) -> NodeResult<Vec<i64>> {
        let raw = node
            .data
            .get("knowledgeBaseIds")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                NodeError::ConfigError(format!(
                    "knowledge_retrieval node '{}' has no knowledgeBaseIds",
                    node.id
                ))
            })?;

        let mut ids = Vec::new();
        for entry in raw {
            let parsed = match entry {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match parsed {
                Some(id) => ids.push(id),
                None => warn!(node_id = %node.id, ?entry, "dropping non-numeric knowledge base id"),
            }
        }
        if ids.is_empty() {
            return Err(NodeError::ConfigError(format!(
                "knowledge_retrieval node '{}' has no usable knowledge base ids",
                node.id
            )));
        }
        Ok(ids)
    }

    fn lenient_usize(node: &Node, key: &str, default: usize) -> usize {
        match node.data.get(key) {
            Some(Value::Number(n)) => n.as_u64().map(|v| v as usize).unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn lenient_f64(node: &Node, key: &str, default: f64) -> f64 {
        match node.data.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

#[async_trait]
impl NodeExecutor for KnowledgeRetrievalExecutor {
    fn node_type(&self) -> &str {
        "knowledge_retrieval"
    }

    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
        let raw_query = node
            .data
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or("");
        let query = ctx.resolve(raw_query);
        if query.trim().is_empty() {
            return Err(NodeError::ConfigError(format!(
                "knowledge_retrieval node '{}' has no query",
                node.id
            )));
        }

        let ids = Self::knowledge_base_ids(node)?;
        let top_k = Self::lenient_usize(node, "topK", DEFAULT_TOP_K);
        let min_score = Self::lenient_f64(node, "minScore", DEFAULT_MIN_SCORE);

        debug!(node_id = %node.id, %query, top_k, min_score, "retrieving knowledge");
        let chunks = self.retrieval.retrieve(&ids, &query, top_k, min_score).await?;

        let mut results = Vec::with_capacity(chunks.len());
        let mut sections = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let title = chunk
                .metadata
                .get("document_title")
                .or_else(|| chunk.metadata.get("title"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string();

            let mut entry = Map::new();
            entry.insert("content".to_string(), chunk.content.clone().into());
            entry.insert("score".to_string(), chunk.score.into());
            entry.insert("similarity".to_string(), chunk.score.into());
            entry.insert("metadata".to_string(), Value::Object(chunk.metadata.clone()));
            entry.insert("document_title".to_string(), title.clone().into());
            results.push(Value::Object(entry));

            sections.push(format!("[Source: {title}]\n{}", chunk.content));
        }

        let top_content = chunks
            .first()
            .map(|c| c.content.clone())
            .unwrap_or_default();

        let mut result = Map::new();
        result.insert("total".to_string(), results.len().into());
        result.insert("results".to_string(), Value::Array(results));
        result.insert("query".to_string(), query.into());
        result.insert("top_content".to_string(), top_content.into());
        result.insert(
            "combined_content".to_string(),
            sections.join("\n\n---\n\n").into(),
        );
        Ok(result)
    }
}
