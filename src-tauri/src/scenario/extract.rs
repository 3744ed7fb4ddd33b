//! Reply normalization: turn `result.response` into one display string.
//!
//! The scenario returns `{ "result": { "response": ... } }` where `response`
//! may be plain text, Markdown, a JSON-encoded string, or an object. Two
//! strategies exist and are chosen per deployment:
//!
//! - `UnwrapText`: decode JSON-looking strings and prefer a `text` field,
//!   pretty-print objects without one.
//! - `Coerce`: take the value as-is; strings verbatim, anything else as
//!   compact JSON.

use crate::error::OcrError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStrategy {
    UnwrapText,
    Coerce,
}

impl ReplyStrategy {
    pub fn parse(value: &str) -> Result<Self, OcrError> {
        match value.trim().to_lowercase().as_str() {
            "unwrap" | "unwrap-text" | "text" => Ok(ReplyStrategy::UnwrapText),
            "coerce" | "raw" => Ok(ReplyStrategy::Coerce),
            other => Err(OcrError::Config(format!(
                "unknown reply strategy: {}. Use 'unwrap' or 'coerce'.",
                other
            ))),
        }
    }

    pub fn extract(self, reply: &Value) -> Result<String, OcrError> {
        match self {
            ReplyStrategy::UnwrapText => extract_response(reply),
            ReplyStrategy::Coerce => coerce_response(reply),
        }
    }
}

/// `result.response`, or `None` when either level is missing.
fn response_field(reply: &Value) -> Option<&Value> {
    reply.get("result")?.get("response")
}

/// Unwrap `result.response`, preferring an embedded `text` field.
pub fn extract_response(reply: &Value) -> Result<String, OcrError> {
    let content = match response_field(reply) {
        Some(v) if is_truthy(v) => v,
        _ => return Err(OcrError::no_content()),
    };

    match content {
        Value::String(raw) => {
            let text = serde_json::from_str::<Value>(raw)
                .ok()
                .as_ref()
                .and_then(text_field)
                .map(display);
            Ok(text.unwrap_or_else(|| raw.clone()))
        }
        Value::Object(_) | Value::Array(_) => match text_field(content) {
            Some(text) => Ok(display(text)),
            None => serde_json::to_string_pretty(content)
                .map_err(|e| OcrError::Format(e.to_string())),
        },
        other => Ok(display(other)),
    }
}

/// Take `result.response` verbatim.
pub fn coerce_response(reply: &Value) -> Result<String, OcrError> {
    match response_field(reply) {
        None | Some(Value::Null) => Err(OcrError::no_content()),
        Some(v) => Ok(display(v)),
    }
}

/// A truthy `text` member of an object.
fn text_field(value: &Value) -> Option<&Value> {
    value.as_object()?.get("text").filter(|t| is_truthy(t))
}

/// Strings as-is, everything else as JSON text.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Empty strings, `false`, zero and null carry no content.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
