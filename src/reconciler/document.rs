//! # Document Text
//!
//! Conversion between content text and store documents.

use serde_json::{Map, Value};

use super::ReconcileError;
use crate::constants::DOCUMENT_ID_FIELD;

/// Parse content text into a JSON object.
///
/// # Errors
///
/// [`ReconcileError::InvalidContent`] when the text is not JSON or is JSON
/// but not an object.
pub fn parse_document(text: &str) -> Result<Value, ReconcileError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ReconcileError::InvalidContent(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ReconcileError::InvalidContent(format!(
            "expected a JSON object, got {}",
            kind(&value)
        )))
    }
}

/// Render a fetched document as compact JSON with sorted keys.
///
/// The store-assigned `_id` is dropped unless `previous_content` declared an
/// `_id` of its own, so a document created without one reads back as it was
/// written.
#[must_use]
pub fn canonicalize(document: Value, previous_content: &str) -> String {
    let mut document = document;
    if !declares_id(previous_content) {
        if let Value::Object(fields) = &mut document {
            fields.remove(DOCUMENT_ID_FIELD);
        }
    }
    sort_keys(document).to_string()
}

fn declares_id(content: &str) -> bool {
    serde_json::from_str::<Value>(content)
        .is_ok_and(|v| v.get(DOCUMENT_ID_FIELD).is_some())
}

// serde_json's `preserve_order` feature may be enabled elsewhere in the
// dependency graph, in which case maps keep insertion order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut entries: Vec<(String, Value)> = fields.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
