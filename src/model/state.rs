//! # Managed Document State

use serde::{Deserialize, Serialize};

use super::{ConnectionTarget, Credentials, DesiredDocumentSpec, Namespace};

/// Store-assigned document identifier
///
/// Opaque: produced by the store on insert and handed back verbatim on every
/// later lookup. Nothing outside a store connector interprets its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The durable record tracked across reconciliations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagedDocumentState {
    pub identifier: DocumentId,
    /// Last JSON payload known to be stored
    pub resolved_content: String,
    pub database: String,
    pub collection: String,
    pub connection_endpoint: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Secret the content was sourced from, if any
    #[serde(default)]
    pub secret_name: Option<String>,
}

impl ManagedDocumentState {
    /// Build the state for a document just written from `spec`
    #[must_use]
    pub fn from_spec(
        spec: &DesiredDocumentSpec,
        identifier: DocumentId,
        resolved_content: String,
    ) -> Self {
        Self {
            identifier,
            resolved_content,
            database: spec.database.clone(),
            collection: spec.collection.clone(),
            connection_endpoint: spec.connection_endpoint.clone(),
            credentials: spec.credentials.clone(),
            secret_name: spec.secret_name.clone(),
        }
    }

    /// Same record with the content replaced by what the store holds
    #[must_use]
    pub fn with_content(&self, resolved_content: String) -> Self {
        Self {
            resolved_content,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn connection_target(&self) -> ConnectionTarget {
        ConnectionTarget {
            endpoint: self.connection_endpoint.clone(),
            credentials: self.credentials.clone(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Namespace {
        Namespace::new(&self.database, &self.collection)
    }
}
