//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use mongodocs_provider::prelude::*;
//! ```

// Document model
pub use crate::model::{
    non_empty, ConnectionTarget, Credentials, DesiredDocumentSpec, DocumentId,
    ManagedDocumentState, Namespace,
};

// Reconciler types - core lifecycle functionality
pub use crate::reconciler::{
    ContentSource, Operation, ReadOutcome, ReconcileError, Reconciler, ResolvedContent,
    StoreOperation,
};

// Store and secret seams
pub use crate::secrets::{AwsSecretsManager, InMemorySecrets, SecretLookupError, SecretSource};
pub use crate::store::{MemoryStore, MongoConnector, StoreConnector, StoreError, StoreSession};

// Host boundary
pub use crate::lifecycle::{
    handle, Diagnostic, DocumentResourceModel, LifecycleRequest, LifecycleResponse, Severity,
};

// Config types
pub use crate::config::{ProviderConfig, SecretsSettings, StoreSettings};
