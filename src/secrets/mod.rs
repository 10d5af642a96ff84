//! # Secret Sources
//!
//! Lookup of document content held in an external secret store.
//!
//! A lookup is a pure read: it never touches the reconciled document and is
//! never retried here. The returned payload is passed on verbatim; checking
//! that it is a usable document is the reconciler's job.

use async_trait::async_trait;
use thiserror::Error;

pub mod aws;
pub mod memory;

pub use aws::AwsSecretsManager;
pub use memory::InMemorySecrets;

/// Errors reported by a secret source
#[derive(Debug, Error)]
pub enum SecretLookupError {
    #[error("secret {name} not found")]
    NotFound { name: String },

    /// The secret exists but carries neither a string nor a binary value
    #[error("secret {name} has no string or binary value")]
    Empty { name: String },

    #[error("failed to read secret {name}: {message}")]
    Backend { name: String, message: String },
}

/// Source of secret payloads by name
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the current value of a secret
    async fn fetch(&self, secret_name: &str) -> Result<String, SecretLookupError>;
}
