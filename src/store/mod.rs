//! # Store Connectors
//!
//! Access to the backing document store.
//!
//! A [`StoreConnector`] opens one [`StoreSession`] per lifecycle operation.
//! Sessions are never pooled or shared between operations; the caller closes
//! every session it opens, and dropping a session (for example while
//! unwinding) releases its resources as well.
//!
//! Implementations:
//! - [`MongoConnector`]: MongoDB through the official driver
//! - [`MemoryStore`]: in-process store for tests and embedding

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::model::{ConnectionTarget, DocumentId, Namespace};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoConnector;

/// Errors reported by a store connector or session
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the connection or its liveness probe failed
    #[error("connection to document store failed: {0}")]
    Connect(String),

    /// No document matches the identifier
    #[error("document {id} not found in {namespace}")]
    NotFound { namespace: String, id: DocumentId },

    /// The document cannot be represented in the store
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Any other store failure
    #[error("{0}")]
    Operation(String),
}

impl StoreError {
    pub fn not_found(namespace: &Namespace, id: &DocumentId) -> Self {
        Self::NotFound {
            namespace: namespace.to_string(),
            id: id.clone(),
        }
    }
}

/// Opens connections to a document store
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a session and verify the store is reachable.
    ///
    /// Credentials on the target are applied as given; a malformed endpoint
    /// or an unreachable store fails here rather than on first use.
    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn StoreSession>, StoreError>;
}

/// A live connection to the store
///
/// Documents are JSON objects. Identifiers are whatever the store assigned on
/// insert and are accepted back verbatim.
#[async_trait]
pub trait StoreSession: Send + Sync {
    /// Insert a document, returning the store-assigned identifier
    async fn insert(&self, namespace: &Namespace, document: Value)
        -> Result<DocumentId, StoreError>;

    /// Fetch a document by identifier; `Ok(None)` when it does not exist
    async fn find_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
    ) -> Result<Option<Value>, StoreError>;

    /// Replace a document by identifier, keeping the identifier.
    /// Fails with [`StoreError::NotFound`] when no document matches.
    async fn replace_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
        document: Value,
    ) -> Result<(), StoreError>;

    /// Delete a document by identifier.
    /// Fails with [`StoreError::NotFound`] when no document matches.
    async fn delete_by_id(&self, namespace: &Namespace, id: &DocumentId)
        -> Result<(), StoreError>;

    /// Release the connection
    async fn close(self: Box<Self>);
}
