//! Bounded asynchronous run dispatch.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tracing::error;

use crate::error::WorkflowResult;
use crate::execution::ExecutionResponse;

use super::ExecutionEngine;

const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Runtime tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on concurrently running executions; submissions beyond it
    /// queue on the semaphore.
    pub max_concurrent_executions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_concurrent_executions: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Accepts runs, returns the `pending` record immediately, and drives each
/// run on a background task under a concurrency limit.
pub struct WorkflowRuntime {
    engine: Arc<ExecutionEngine>,
    permits: Arc<Semaphore>,
}

impl WorkflowRuntime {
    pub fn new(engine: Arc<ExecutionEngine>, config: EngineConfig) -> Self {
        WorkflowRuntime {
            engine,
            permits: Arc::new(Semaphore::new(config.max_concurrent_executions)),
        }
    }

    /// Validate and enqueue a run. Validation failures surface here; the
    /// returned response is the `pending` record, to be polled via
    /// [`WorkflowRuntime::get_execution`].
    pub async fn submit(
        &self,
        workflow_id: &str,
        user_id: &str,
        input_params: Map<String, Value>,
    ) -> WorkflowResult<ExecutionResponse> {
        let prepared = self.engine.prepare(workflow_id, user_id, input_params).await?;
        let response = ExecutionResponse::from(prepared.record());

        let engine = self.engine.clone();
        let permits = self.permits.clone();
        let execution_id = response.id.clone();
        tokio::spawn(async move {
            // Closed only on drop of the runtime's last permit handle, which
            // cannot happen while this task holds a clone.
            let Ok(_permit) = permits.acquire_owned().await else {
                error!(%execution_id, "runtime semaphore closed, dropping run");
                return;
            };
            if let Err(e) = engine.run(prepared).await {
                error!(%execution_id, error = %e, "failed to persist execution outcome");
            }
        });

        Ok(response)
    }

    pub async fn get_execution(&self, execution_id: &str) -> WorkflowResult<ExecutionResponse> {
        self.engine.get_execution(execution_id).await
    }
}
