//! The execution engine.
//!
//! [`ExecutionEngine::prepare`] loads and validates a workflow and persists a
//! `pending` record; [`ExecutionEngine::run`] then walks the topological
//! order, dispatching each node to its registered executor. The split lets a
//! caller hand the pending record back immediately and drive the run
//! asynchronously (see [`WorkflowRuntime`]).

mod runtime;

pub use runtime::{EngineConfig, WorkflowRuntime};

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::core::ExecutionContext;
use crate::error::{WorkflowError, WorkflowResult};
use crate::evaluator::evaluate_edge_condition;
use crate::execution::{ExecutionRecord, ExecutionResponse, ExecutionStatus, NodeStatus};
use crate::graph::{topological_order, validate_definition, WorkflowDefinition};
use crate::nodes::NodeExecutorRegistry;
use crate::repository::{ExecutionRepository, WorkflowRepository};

/// A validated run that has not started yet. Its record is already persisted
/// as `pending`.
pub struct PreparedExecution {
    definition: Arc<WorkflowDefinition>,
    order: Vec<String>,
    record: ExecutionRecord,
    input_params: Map<String, Value>,
}

impl PreparedExecution {
    pub fn record(&self) -> &ExecutionRecord {
        &self.record
    }
}

/// Drives workflow runs end to end against the repositories and registry.
pub struct ExecutionEngine {
    workflows: Arc<dyn WorkflowRepository>,
    executions: Arc<dyn ExecutionRepository>,
    registry: Arc<NodeExecutorRegistry>,
}

impl ExecutionEngine {
    pub fn new(
        workflows: Arc<dyn WorkflowRepository>,
        executions: Arc<dyn ExecutionRepository>,
        registry: Arc<NodeExecutorRegistry>,
    ) -> Self {
        ExecutionEngine {
            workflows,
            executions,
            registry,
        }
    }

    /// Load, validate, and order the workflow, then persist a `pending`
    /// record. Nothing is persisted when validation fails.
    pub async fn prepare(
        &self,
        workflow_id: &str,
        user_id: &str,
        input_params: Map<String, Value>,
    ) -> WorkflowResult<PreparedExecution> {
        let definition = self
            .workflows
            .find_by_id(workflow_id)
            .await?
            .ok_or_else(|| WorkflowError::WorkflowNotFound(workflow_id.to_string()))?;

        validate_definition(&definition)?;
        let order = topological_order(&definition)?;

        let record = ExecutionRecord::new(workflow_id, user_id, &input_params);
        self.executions.create(&record).await?;
        info!(workflow_id, execution_id = %record.id, "execution prepared");

        Ok(PreparedExecution {
            definition: Arc::new(definition),
            order,
            record,
            input_params,
        })
    }

    /// Run a prepared execution to its terminal state. Node failures are
    /// captured in the record; only storage failures surface as errors.
    pub async fn run(&self, prepared: PreparedExecution) -> WorkflowResult<ExecutionResponse> {
        let PreparedExecution {
            definition,
            order,
            mut record,
            input_params,
        } = prepared;

        record.status = ExecutionStatus::Running;
        record.started_at = Some(Utc::now());
        self.executions.update(&record).await?;

        let mut ctx = ExecutionContext::new(
            definition,
            input_params,
            record.user_id.clone(),
            record.id.clone(),
        );

        let outcome = self.run_nodes(&mut ctx, &order).await;

        let results = serde_json::to_string(&ctx.results_as_value()).unwrap_or_else(|e| {
            warn!(execution_id = %record.id, "failed to serialize results: {e}");
            "{}".to_string()
        });
        record.output_result = Some(results);
        record.completed_at = Some(Utc::now());
        match outcome {
            Ok(()) => {
                record.status = ExecutionStatus::Completed;
                info!(execution_id = %record.id, "execution completed");
            }
            Err(e) => {
                record.status = ExecutionStatus::Failed;
                record.error_message = Some(e.to_string());
                error!(execution_id = %record.id, error = %e, "execution failed");
            }
        }
        self.executions.update(&record).await?;

        Ok(ExecutionResponse::from(&record))
    }

    /// Prepare and run in one call.
    pub async fn execute_by_id(
        &self,
        workflow_id: &str,
        user_id: &str,
        input_params: Map<String, Value>,
    ) -> WorkflowResult<ExecutionResponse> {
        let prepared = self.prepare(workflow_id, user_id, input_params).await?;
        self.run(prepared).await
    }

    pub async fn get_execution(&self, execution_id: &str) -> WorkflowResult<ExecutionResponse> {
        let record = self
            .executions
            .find_by_id(execution_id)
            .await?
            .ok_or_else(|| WorkflowError::ExecutionNotFound(execution_id.to_string()))?;
        Ok(ExecutionResponse::from(&record))
    }

    pub async fn list_by_workflow(
        &self,
        workflow_id: &str,
    ) -> WorkflowResult<Vec<ExecutionResponse>> {
        let records = self.executions.find_by_workflow(workflow_id).await?;
        Ok(records.iter().map(ExecutionResponse::from).collect())
    }

    pub async fn list_by_user(&self, user_id: &str) -> WorkflowResult<Vec<ExecutionResponse>> {
        let records = self.executions.find_by_user(user_id).await?;
        Ok(records.iter().map(ExecutionResponse::from).collect())
    }

    async fn run_nodes(&self, ctx: &mut ExecutionContext, order: &[String]) -> WorkflowResult<()> {
        for node_id in order {
            let node = ctx
                .node_by_id(node_id)
                .ok_or_else(|| WorkflowError::NodeNotFound(node_id.clone()))?
                .clone();

            if self.should_skip(ctx, node_id) {
                ctx.set_status(node_id, NodeStatus::Skipped);
                ctx.log(format!("node {node_id} skipped"));
                debug!(node_id, "node skipped");
                continue;
            }

            let executor = self
                .registry
                .get(&node.node_type)
                .ok_or_else(|| WorkflowError::ExecutorNotFound(node.node_type.clone()))?;

            ctx.set_status(node_id, NodeStatus::Running);
            ctx.log(format!("node {node_id} started"));

            match executor.execute(&node, ctx).await {
                Ok(result) => {
                    ctx.add_node_result(node_id, result);
                    ctx.set_status(node_id, NodeStatus::Completed);
                    ctx.log(format!("node {node_id} completed"));
                }
                Err(e) => {
                    ctx.set_status(node_id, NodeStatus::Failed);
                    ctx.log(format!("node {node_id} failed: {e}"));
                    return Err(WorkflowError::node_execution(node_id.as_str(), &e));
                }
            }

            if node.node_type == "end" {
                debug!(node_id, "end node reached, stopping");
                break;
            }
        }
        Ok(())
    }

    /// A node is skipped when any predecessor did not complete, or when any
    /// incoming edge carries a condition that evaluates false. Entry nodes
    /// have no incoming edges and always run.
    fn should_skip(&self, ctx: &ExecutionContext, node_id: &str) -> bool {
        for edge in ctx.incoming_edges(node_id) {
            if ctx.status(&edge.source) != NodeStatus::Completed {
                return true;
            }
            if !evaluate_edge_condition(edge.condition.as_deref(), ctx.context_data()) {
                return true;
            }
        }
        false
    }
}
