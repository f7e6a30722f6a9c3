//! Node executors and the type-keyed registry.
//!
//! Each node type is handled by one [`NodeExecutor`]. The engine looks the
//! executor up in a [`NodeExecutorRegistry`] at dispatch time, so custom node
//! types plug in without touching the engine.

mod control_flow;
mod executor;
mod http;
mod intent;
mod knowledge;
mod llm_node;

pub use control_flow::{EndNodeExecutor, StartNodeExecutor};
pub use executor::{default_registry, NodeExecutor, NodeExecutorRegistry};
pub use http::HttpNodeExecutor;
pub use intent::IntentRecognitionExecutor;
pub use knowledge::KnowledgeRetrievalExecutor;
pub use llm_node::LlmNodeExecutor;
