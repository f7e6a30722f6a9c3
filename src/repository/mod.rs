//! Persistence collaborator interfaces and in-memory implementations.
//!
//! The engine reads definitions through [`WorkflowRepository`] and writes
//! execution records through [`ExecutionRepository`]; it is the only writer.
//! The in-memory implementations back the tests and the demo binary.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{WorkflowError, WorkflowResult};
use crate::execution::ExecutionRecord;
use crate::graph::WorkflowDefinition;

/// Read-only lookup of workflow definitions.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn find_by_id(&self, workflow_id: &str) -> WorkflowResult<Option<WorkflowDefinition>>;
}

/// Persistence path for execution records.
///
/// `update` must be idempotent per execution id; the engine writes at three
/// checkpoints (create, running, terminal).
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn create(&self, record: &ExecutionRecord) -> WorkflowResult<()>;
    async fn update(&self, record: &ExecutionRecord) -> WorkflowResult<()>;
    async fn find_by_id(&self, execution_id: &str) -> WorkflowResult<Option<ExecutionRecord>>;
    async fn find_by_workflow(&self, workflow_id: &str) -> WorkflowResult<Vec<ExecutionRecord>>;
    async fn find_by_user(&self, user_id: &str) -> WorkflowResult<Vec<ExecutionRecord>>;
}

/// In-memory workflow store.
#[derive(Default)]
pub struct InMemoryWorkflowRepository {
    workflows: RwLock<HashMap<String, WorkflowDefinition>>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, workflow_id: impl Into<String>, definition: WorkflowDefinition) {
        self.workflows.write().insert(workflow_id.into(), definition);
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn find_by_id(&self, workflow_id: &str) -> WorkflowResult<Option<WorkflowDefinition>> {
        Ok(self.workflows.read().get(workflow_id).cloned())
    }
}

/// In-memory execution store keyed by execution id.
#[derive(Default)]
pub struct InMemoryExecutionRepository {
    records: RwLock<HashMap<String, ExecutionRecord>>,
}

impl InMemoryExecutionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionRepository for InMemoryExecutionRepository {
    async fn create(&self, record: &ExecutionRecord) -> WorkflowResult<()> {
        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(WorkflowError::StorageError(format!(
                "execution already exists: {}",
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &ExecutionRecord) -> WorkflowResult<()> {
        self.records.write().insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, execution_id: &str) -> WorkflowResult<Option<ExecutionRecord>> {
        Ok(self.records.read().get(execution_id).cloned())
    }

    async fn find_by_workflow(&self, workflow_id: &str) -> WorkflowResult<Vec<ExecutionRecord>> {
        let mut matches: Vec<ExecutionRecord> = self
            .records
            .read()
            .values()
            .filter(|r| r.workflow_id == workflow_id)
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.created_at);
        Ok(matches)
    }

    async fn find_by_user(&self, user_id: &str) -> WorkflowResult<Vec<ExecutionRecord>> {
        let mut matches: Vec<ExecutionRecord> = self
            .records
            .read()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.created_at);
        Ok(matches)
    }
}
