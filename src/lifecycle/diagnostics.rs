//! # Diagnostics
//!
//! Host-facing error and warning messages.

use serde::{Deserialize, Serialize};

use crate::reconciler::{ReconcileError, StoreOperation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&ReconcileError> for Diagnostic {
    fn from(error: &ReconcileError) -> Self {
        match error {
            ReconcileError::Connection(source) => Self::error(
                "Failed to connect to MongoDB",
                format!("Unable to connect to MongoDB: {source}"),
            ),
            ReconcileError::MissingContent => Self::error(
                "Missing Document Content",
                "Either content or secret_name must be provided",
            ),
            ReconcileError::SecretLookup(source) => Self::error(
                "Failed to fetch secret",
                format!("Unable to retrieve document from AWS Secrets Manager: {source}"),
            ),
            ReconcileError::InvalidContent(message) => Self::error(
                "Invalid Document Content",
                format!("Unable to parse document content: {message}"),
            ),
            ReconcileError::StoreOperation { operation, source } => match operation {
                StoreOperation::Insert => Self::error(
                    "Failed to Insert Document",
                    format!("Unable to insert document: {source}"),
                ),
                StoreOperation::Find => Self::error(
                    "Failed to Fetch Document",
                    format!("Unable to find document: {source}"),
                ),
                StoreOperation::Replace => Self::error(
                    "Failed to Update Document",
                    format!("Unable to update document: {source}"),
                ),
                StoreOperation::Delete => Self::error(
                    "Failed to Delete Document",
                    format!("Unable to delete document: {source}"),
                ),
            },
            ReconcileError::NotFoundOnUpdate { identifier } => Self::error(
                "Document Not Found",
                format!(
                    "Document {identifier} no longer exists in the store. \
                     Refresh state to drop it and plan a new document."
                ),
            ),
        }
    }
}
