//! Knowledge-base retrieval collaborator interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NodeResult;

/// One retrieved snippet, ranked by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Retrieval collaborator: returns ranked snippets for a query against a set
/// of knowledge bases. The executor passes the list through as-is.
#[async_trait]
pub trait KnowledgeRetrievalClient: Send + Sync {
    async fn retrieve(
        &self,
        knowledge_base_ids: &[i64],
        query: &str,
        top_k: usize,
        min_score: f64,
    ) -> NodeResult<Vec<RetrievedChunk>>;
}
