//! Per-run runtime state and transport plumbing.

pub mod execution_context;
pub mod http_client;

pub use execution_context::{ExecutionContext, LogEntry, NodeResultMap};
pub use http_client::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
