//! The persisted execution record and its caller-facing response form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use super::status::ExecutionStatus;

/// One run of a workflow, as persisted through the execution repository.
///
/// `input_params` and `output_result` are stored serialized; the engine is
/// the only writer of this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub workflow_id: String,
    pub user_id: String,
    pub status: ExecutionStatus,
    pub input_params: String,
    pub output_result: Option<String>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Create a fresh `pending` record for a run about to be dispatched.
    pub fn new(workflow_id: &str, user_id: &str, input_params: &Map<String, Value>) -> Self {
        let input_json = serde_json::to_string(input_params).unwrap_or_else(|e| {
            warn!("failed to serialize input params: {e}");
            "{}".to_string()
        });
        ExecutionRecord {
            id: Uuid::new_v4().to_string(),
            workflow_id: workflow_id.to_string(),
            user_id: user_id.to_string(),
            status: ExecutionStatus::Pending,
            input_params: input_json,
            output_result: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Caller-facing view of an [`ExecutionRecord`] with the JSON payloads
/// re-parsed to structured values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub id: String,
    pub workflow_id: String,
    pub user_id: String,
    pub status: ExecutionStatus,
    pub input_params: Value,
    pub output_result: Option<Value>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ExecutionRecord> for ExecutionResponse {
    fn from(record: &ExecutionRecord) -> Self {
        let input_params = serde_json::from_str(&record.input_params).unwrap_or_else(|e| {
            warn!(execution_id = %record.id, "failed to parse stored input params: {e}");
            Value::Null
        });
        let output_result = record.output_result.as_deref().map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!(execution_id = %record.id, "failed to parse stored output result: {e}");
                Value::Null
            })
        });
        ExecutionResponse {
            id: record.id.clone(),
            workflow_id: record.workflow_id.clone(),
            user_id: record.user_id.clone(),
            status: record.status,
            input_params,
            output_result,
            error_message: record.error_message.clone(),
            started_at: record.started_at,
            completed_at: record.completed_at,
            created_at: record.created_at,
        }
    }
}
