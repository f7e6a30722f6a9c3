//! `{placeholder}` substitution over the per-run variable pool.
//!
//! Placeholders are scanned left to right, non-overlapping, and resolved
//! against the execution context:
//!
//! - `{input.NAME}` reads the run's input parameters.
//! - `{NAME}` reads the flattened `context_data` pool; failing that, `NAME`
//!   is parsed as `nodeId.field` and looked up in that node's result (with a
//!   fallback into the result's nested `data` object).
//!
//! Unresolvable placeholders are left verbatim; substitution never fails.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::core::execution_context::ExecutionContext;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder regex is valid"))
}

/// Replace every resolvable `{...}` token in `text`; unresolved tokens pass
/// through unchanged.
pub fn resolve_placeholders(text: &str, ctx: &ExecutionContext) -> String {
    if text.is_empty() || !text.contains('{') {
        return text.to_string();
    }

    placeholder_regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let path = &caps[1];
            lookup(path, ctx).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn lookup(path: &str, ctx: &ExecutionContext) -> Option<String> {
    if let Some(param) = path.strip_prefix("input.") {
        return ctx.input_params().get(param).and_then(value_to_text);
    }

    // flattened variable first, then nodeId.field
    if let Some(value) = ctx.context_data().get(path) {
        if let Some(text) = value_to_text(value) {
            return Some(text);
        }
    }

    let (node_id, field) = path.split_once('.')?;
    let result = ctx.node_result(node_id)?;
    if let Some(value) = result.get(field) {
        if let Some(text) = value_to_text(value) {
            return Some(text);
        }
    }
    // fall back into the node's nested `data` object
    result
        .get("data")
        .and_then(Value::as_object)
        .and_then(|data| data.get(field))
        .and_then(value_to_text)
}

/// Plain-text rendering of a JSON value. `Null` counts as absent so the
/// placeholder stays in place.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
