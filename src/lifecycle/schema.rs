//! # Resource Schema
//!
//! JSON Schema for [`DocumentResourceModel`], generated with `schemars` and
//! annotated with the host attribute markers:
//!
//! - `id` is computed (`readOnly`, `x-computed`)
//! - `username` and `password` are sensitive (`writeOnly`, `x-sensitive`)

use serde_json::Value;

use super::DocumentResourceModel;
use crate::constants::DOCUMENT_RESOURCE_TYPE;

const COMPUTED_ATTRIBUTES: [&str; 1] = ["id"];
const SENSITIVE_ATTRIBUTES: [&str; 2] = ["username", "password"];

/// Generate the annotated schema of the document resource
#[must_use]
pub fn resource_schema() -> Value {
    let mut schema = Value::from(schemars::schema_for!(DocumentResourceModel));

    if let Some(root) = schema.as_object_mut() {
        root.insert(
            "title".to_string(),
            Value::String(DOCUMENT_RESOURCE_TYPE.to_string()),
        );
    }

    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        for name in COMPUTED_ATTRIBUTES {
            if let Some(Value::Object(property)) = properties.get_mut(name) {
                property.insert("readOnly".to_string(), Value::Bool(true));
                property.insert("x-computed".to_string(), Value::Bool(true));
            }
        }
        for name in SENSITIVE_ATTRIBUTES {
            if let Some(Value::Object(property)) = properties.get_mut(name) {
                property.insert("writeOnly".to_string(), Value::Bool(true));
                property.insert("x-sensitive".to_string(), Value::Bool(true));
            }
        }
    }

    schema
}
