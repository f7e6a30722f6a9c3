//! # AgentFlow — a DAG workflow orchestration engine
//!
//! `agentflow` executes workflows defined as directed acyclic graphs of typed
//! nodes:
//!
//! - **Graph model and validation**: node/edge definitions with structural
//!   checks (ids, dangling edges, self-loops, entry/exit nodes, cycles,
//!   reachability) run before any node executes.
//! - **Deterministic execution**: nodes run in a topological order with a
//!   stable definition-order tie-break, so the same definition always yields
//!   the same sequence.
//! - **Typed node executors**: start, end, http, llm, intent_recognition, and
//!   knowledge_retrieval executors dispatched through a pluggable registry.
//! - **Variable substitution**: `{placeholder}` tokens in node configuration
//!   resolve against run inputs and upstream node results.
//! - **Conditional routing**: edges may carry `variable == 'literal'` guards;
//!   unsatisfied branches are skipped, and skips propagate downstream.
//! - **Execution records**: each run persists a record through the
//!   `pending -> running -> completed | failed` state machine.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agentflow::{
//!     default_registry, EngineConfig, ExecutionEngine, InMemoryExecutionRepository,
//!     InMemoryWorkflowRepository, WorkflowRuntime,
//! };
//!
//! # async fn run(
//! #     chat: Arc<dyn agentflow::ChatCompletionClient>,
//! #     retrieval: Arc<dyn agentflow::KnowledgeRetrievalClient>,
//! #     transport: Arc<dyn agentflow::HttpTransport>,
//! # ) {
//! let workflows = Arc::new(InMemoryWorkflowRepository::new());
//! let executions = Arc::new(InMemoryExecutionRepository::new());
//! let registry = Arc::new(default_registry(chat, retrieval, transport));
//! let engine = Arc::new(ExecutionEngine::new(workflows, executions, registry));
//! let runtime = WorkflowRuntime::new(engine, EngineConfig::default());
//!
//! let pending = runtime
//!     .submit("my-workflow", "user-1", serde_json::Map::new())
//!     .await
//!     .unwrap();
//! let outcome = runtime.get_execution(&pending.id).await.unwrap();
//! println!("{:?}", outcome.status);
//! # }
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod execution;
pub mod graph;
pub mod knowledge;
pub mod llm;
pub mod nodes;
pub mod repository;
pub mod template;

pub use crate::core::{
    ExecutionContext, HttpRequest, HttpResponse, HttpTransport, LogEntry, NodeResultMap,
    ReqwestTransport,
};
pub use crate::engine::{EngineConfig, ExecutionEngine, PreparedExecution, WorkflowRuntime};
pub use crate::error::{NodeError, NodeResult, WorkflowError, WorkflowResult};
pub use crate::evaluator::evaluate_edge_condition;
pub use crate::execution::{ExecutionRecord, ExecutionResponse, ExecutionStatus, NodeStatus};
pub use crate::graph::{
    topological_order, validate_definition, Edge, Node, WorkflowDefinition,
};
pub use crate::knowledge::{KnowledgeRetrievalClient, RetrievedChunk};
pub use crate::llm::{ChatCompletionClient, ChatRequest, ChatResponse, LlmError};
pub use crate::nodes::{
    default_registry, EndNodeExecutor, HttpNodeExecutor, IntentRecognitionExecutor,
    KnowledgeRetrievalExecutor, LlmNodeExecutor, NodeExecutor, NodeExecutorRegistry,
    StartNodeExecutor,
};
pub use crate::repository::{
    ExecutionRepository, InMemoryExecutionRepository, InMemoryWorkflowRepository,
    WorkflowRepository,
};
pub use crate::template::resolve_placeholders;
