//! The http node executor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{ExecutionContext, HttpRequest, HttpTransport, NodeResultMap};
use crate::error::{NodeError, NodeResult};
use crate::graph::Node;

use super::executor::NodeExecutor;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Issues one outbound HTTP request per node execution.
///
/// Placeholders are resolved in the url, header values, and body before the
/// request is sent. A transport-level failure or a non-2xx status fails the
/// node.
pub struct HttpNodeExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl HttpNodeExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        HttpNodeExecutor { transport }
    }

    fn build_request(&self, node: &Node, ctx: &ExecutionContext) -> NodeResult<HttpRequest> {
        let url = node
            .data
            .get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                NodeError::ConfigError(format!("http node '{}' has no url", node.id))
            })?;
        let url = ctx.resolve(url);

        let method = node
            .data
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("GET")
            .to_uppercase();

        let mut headers = Vec::new();
        if let Some(Value::Object(raw)) = node.data.get("headers") {
            for (key, value) in raw {
                if let Some(text) = value.as_str() {
                    headers.push((key.clone(), ctx.resolve(text)));
                }
            }
        }

        let body = match node.data.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(ctx.resolve(text)),
            Some(other) => {
                let serialized = serde_json::to_string(other)?;
                Some(ctx.resolve(&serialized))
            }
        };

        let timeout_ms = node
            .data
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[async_trait]
impl NodeExecutor for HttpNodeExecutor {
    fn node_type(&self) -> &str {
        "http"
    }

    async fn execute(&self, node: &Node, ctx: &ExecutionContext) -> NodeResult<NodeResultMap> {
        let request = self.build_request(node, ctx)?;
        debug!(node_id = %node.id, method = %request.method, url = %request.url, "sending http request");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(NodeError::HttpError(format!(
                "HTTP request failed with status {}: {}",
                response.status, response.body
            )));
        }

        // Prefer structured bodies; fall back to the raw text.
        let body: Value = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));

        let mut header_map = Map::new();
        for (key, value) in response.headers {
            header_map.insert(key, Value::String(value));
        }

        let mut result = Map::new();
        result.insert("status".to_string(), response.status.into());
        result.insert("body".to_string(), body);
        result.insert("headers".to_string(), Value::Object(header_map));
        result.insert("success".to_string(), Value::Bool(true));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HttpResponse;
    use crate::graph::WorkflowDefinition;
    use parking_lot::Mutex;
    use serde_json::json;

    struct CannedTransport {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Self {
            CannedTransport {
                response: HttpResponse {
                    status,
                    body: body.to_string(),
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                },
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> NodeResult<HttpResponse> {
            self.seen.lock().push(request);
            Ok(self.response.clone())
        }
    }

    fn context_with_node(data: Value) -> (ExecutionContext, Node) {
        let definition: WorkflowDefinition = serde_json::from_value(json!({
            "nodes": [{"id": "h1", "type": "http", "data": data}],
            "edges": []
        }))
        .unwrap();
        let mut inputs = Map::new();
        inputs.insert("city".to_string(), json!("berlin"));
        let ctx = ExecutionContext::new(
            Arc::new(definition),
            inputs,
            "user1".into(),
            "exec1".into(),
        );
        let node = ctx.node_by_id("h1").unwrap().clone();
        (ctx, node)
    }

    #[tokio::test]
    async fn test_successful_request_parses_json_body() {
        let transport = Arc::new(CannedTransport::new(200, r#"{"temp": 21}"#));
        let executor = HttpNodeExecutor::new(transport.clone());
        let (ctx, node) = context_with_node(json!({
            "url": "https://api.example.com/weather?city={city}",
            "method": "get",
            "headers": {"x-api-key": "secret"}
        }));

        let result = executor.execute(&node, &ctx).await.unwrap();
        assert_eq!(result["status"], json!(200));
        assert_eq!(result["body"]["temp"], json!(21));
        assert_eq!(result["success"], json!(true));

        let sent = transport.seen.lock();
        assert_eq!(sent[0].method, "GET");
        assert_eq!(sent[0].url, "https://api.example.com/weather?city=berlin");
        assert_eq!(sent[0].timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[tokio::test]
    async fn test_non_json_body_kept_as_text() {
        let executor = HttpNodeExecutor::new(Arc::new(CannedTransport::new(200, "plain text")));
        let (ctx, node) = context_with_node(json!({"url": "https://example.com"}));

        let result = executor.execute(&node, &ctx).await.unwrap();
        assert_eq!(result["body"], json!("plain text"));
    }

    #[tokio::test]
    async fn test_missing_url_is_config_error() {
        let executor = HttpNodeExecutor::new(Arc::new(CannedTransport::new(200, "{}")));
        let (ctx, node) = context_with_node(json!({"method": "POST"}));

        let err = executor.execute(&node, &ctx).await.unwrap_err();
        assert!(matches!(err, NodeError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_error_status_fails_node() {
        let executor =
            HttpNodeExecutor::new(Arc::new(CannedTransport::new(500, "internal error")));
        let (ctx, node) = context_with_node(json!({"url": "https://example.com"}));

        let err = executor.execute(&node, &ctx).await.unwrap_err();
        assert!(matches!(err, NodeError::HttpError(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_structured_body_serialized_and_resolved() {
        let transport = Arc::new(CannedTransport::new(201, "{}"));
        let executor = HttpNodeExecutor::new(transport.clone());
        let (ctx, node) = context_with_node(json!({
            "url": "https://example.com",
            "method": "POST",
            "body": {"query": "{city}"},
            "timeout": 500
        }));

        executor.execute(&node, &ctx).await.unwrap();
        let sent = transport.seen.lock();
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"query":"berlin"}"#));
        assert_eq!(sent[0].timeout, Duration::from_millis(500));
    }
}
