use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map};

use agentflow::{
    default_registry, ChatCompletionClient, ChatRequest, ChatResponse, EngineConfig,
    ExecutionEngine, ExecutionStatus, InMemoryExecutionRepository, InMemoryWorkflowRepository,
    LlmError, ReqwestTransport, WorkflowDefinition, WorkflowRuntime,
};

/// Offline chat client so the demo runs without a model endpoint.
struct CannedChatClient;

#[async_trait]
impl ChatCompletionClient for CannedChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            content: format!("echo: {}", request.user_prompt),
            role: "assistant".to_string(),
        })
    }
}

/// Retrieval client that never finds anything.
struct EmptyRetrievalClient;

#[async_trait]
impl agentflow::KnowledgeRetrievalClient for EmptyRetrievalClient {
    async fn retrieve(
        &self,
        _knowledge_base_ids: &[i64],
        _query: &str,
        _top_k: usize,
        _min_score: f64,
    ) -> agentflow::NodeResult<Vec<agentflow::RetrievedChunk>> {
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== AgentFlow Workflow Engine ===\n");

    let definition: WorkflowDefinition = serde_json::from_value(json!({
        "nodes": [
            {"id": "start1", "type": "start", "name": "Start"},
            {
                "id": "llm1",
                "type": "llm",
                "name": "Answer",
                "data": {
                    "system_prompt": "You answer briefly.",
                    "user_prompt": "Answer the question: {input.question}"
                }
            },
            {"id": "end1", "type": "end", "name": "End"}
        ],
        "edges": [
            {"id": "e1", "source": "start1", "target": "llm1"},
            {"id": "e2", "source": "llm1", "target": "end1"}
        ]
    }))
    .expect("demo workflow definition is valid JSON");

    let workflows = Arc::new(InMemoryWorkflowRepository::new());
    workflows.insert("demo", definition);

    let executions = Arc::new(InMemoryExecutionRepository::new());
    let registry = Arc::new(default_registry(
        Arc::new(CannedChatClient),
        Arc::new(EmptyRetrievalClient),
        Arc::new(ReqwestTransport::new()),
    ));
    let engine = Arc::new(ExecutionEngine::new(workflows, executions, registry));
    let runtime = WorkflowRuntime::new(engine, EngineConfig::default());

    let mut inputs = Map::new();
    inputs.insert("question".to_string(), json!("What is a DAG?"));

    let pending = runtime
        .submit("demo", "demo-user", inputs)
        .await
        .expect("failed to submit workflow");
    println!("[OK] submitted execution {} ({})", pending.id, pending.status);

    // Poll until the background run reaches a terminal state.
    let outcome = loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let current = runtime
            .get_execution(&pending.id)
            .await
            .expect("execution record disappeared");
        if current.status.is_terminal() {
            break current;
        }
    };

    match outcome.status {
        ExecutionStatus::Completed => {
            println!("\n=== Workflow completed ===");
            if let Some(results) = &outcome.output_result {
                if let Some(map) = results.as_object() {
                    for (node_id, result) in map {
                        println!("  {} = {}", node_id, result);
                    }
                }
            }
        }
        _ => {
            println!(
                "\n=== Workflow {}: {} ===",
                outcome.status,
                outcome.error_message.as_deref().unwrap_or("no error recorded")
            );
        }
    }
}
