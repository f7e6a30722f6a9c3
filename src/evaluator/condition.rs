//! Evaluation of edge guard conditions.
//!
//! Supports the single equality form `variable == 'literal'`. Anything that
//! does not parse defaults to "condition passes" (fail-open), so a malformed
//! guard never blocks the graph.

use serde_json::{Map, Value};
use tracing::warn;

use crate::template::value_to_text;

/// Evaluate an edge condition against the flattened variable pool.
///
/// Returns `true` when the condition is absent, empty, or unparseable; a
/// parsed condition is `true` only when the variable exists and its textual
/// form equals the literal.
pub fn evaluate_edge_condition(condition: Option<&str>, context_data: &Map<String, Value>) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    let condition = condition.trim();
    if condition.is_empty() {
        return true;
    }

    let parts: Vec<&str> = condition.split("==").collect();
    if parts.len() != 2 {
        warn!(condition, "unparseable edge condition, passing");
        return true;
    }

    let variable = parts[0].trim();
    let literal = strip_quotes(parts[1].trim());

    match context_data.get(variable).and_then(value_to_text) {
        Some(actual) => actual == literal,
        None => false,
    }
}

fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool(value: serde_json::Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_absent_condition_passes() {
        assert!(evaluate_edge_condition(None, &pool(json!({}))));
        assert!(evaluate_edge_condition(Some(""), &pool(json!({}))));
        assert!(evaluate_edge_condition(Some("   "), &pool(json!({}))));
    }

    #[test]
    fn test_equality_match() {
        let data = pool(json!({"status": "ok"}));
        assert!(evaluate_edge_condition(Some("status == 'ok'"), &data));
        assert!(evaluate_edge_condition(Some("status == \"ok\""), &data));
        assert!(evaluate_edge_condition(Some("status == ok"), &data));
    }

    #[test]
    fn test_equality_mismatch() {
        let data = pool(json!({"status": "error"}));
        assert!(!evaluate_edge_condition(Some("status == 'ok'"), &data));
    }

    #[test]
    fn test_missing_variable_fails() {
        assert!(!evaluate_edge_condition(
            Some("status == 'ok'"),
            &pool(json!({}))
        ));
    }

    #[test]
    fn test_numeric_value_compared_as_text() {
        let data = pool(json!({"count": 3}));
        assert!(evaluate_edge_condition(Some("count == '3'"), &data));
        assert!(!evaluate_edge_condition(Some("count == '4'"), &data));
    }

    #[test]
    fn test_unparseable_condition_fails_open() {
        let data = pool(json!({"status": "ok"}));
        assert!(evaluate_edge_condition(Some("status > 'ok'"), &data));
        assert!(evaluate_edge_condition(Some("a == b == c"), &data));
    }
}
