//! # Reconcile Errors

use thiserror::Error;

use crate::model::DocumentId;
use crate::secrets::SecretLookupError;
use crate::store::StoreError;

/// Store call that failed during an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Insert,
    Find,
    Replace,
    Delete,
}

impl StoreOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Find => "find",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by lifecycle operations
///
/// Every variant is fatal for the operation that produced it. None of them is
/// retried, and none leaves a partially mutated state behind.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The store could not be opened or did not answer the liveness probe
    #[error("unable to connect to document store: {0}")]
    Connection(#[source] StoreError),

    /// Neither a secret name nor inline content was supplied
    #[error("either content or secret_name must be provided")]
    MissingContent,

    #[error("unable to retrieve document content from secret store: {0}")]
    SecretLookup(#[from] SecretLookupError),

    /// The resolved content is not a JSON object
    #[error("unable to parse document content: {0}")]
    InvalidContent(String),

    #[error("store {operation} failed: {source}")]
    StoreOperation {
        operation: StoreOperation,
        #[source]
        source: StoreError,
    },

    /// The tracked document vanished before it could be replaced
    #[error("document {identifier} no longer exists; it may have been deleted outside of this provider")]
    NotFoundOnUpdate { identifier: DocumentId },
}

impl ReconcileError {
    pub(crate) fn store(operation: StoreOperation, source: StoreError) -> Self {
        Self::StoreOperation { operation, source }
    }
}
