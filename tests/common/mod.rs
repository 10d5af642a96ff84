//! Common fixtures for integration tests
//!
//! Builds a [`Reconciler`] over the in-process store and secret source so
//! tests can drive the lifecycle and then inspect what the store saw.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use mongodocs_provider::lifecycle::DocumentResourceModel;
use mongodocs_provider::model::{DesiredDocumentSpec, Namespace};
use mongodocs_provider::reconciler::Reconciler;
use mongodocs_provider::secrets::InMemorySecrets;
use mongodocs_provider::store::MemoryStore;

pub const ENDPOINT: &str = "mongodb://localhost:27017";
pub const DATABASE: &str = "app";
pub const COLLECTION: &str = "docs";

pub struct Harness {
    pub reconciler: Reconciler,
    pub store: MemoryStore,
    pub secrets: InMemorySecrets,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(MemoryStore::new(), InMemorySecrets::new())
    }

    pub fn with(store: MemoryStore, secrets: InMemorySecrets) -> Self {
        let reconciler = Reconciler::new(Arc::new(store.clone()), Arc::new(secrets.clone()));
        Self {
            reconciler,
            store,
            secrets,
        }
    }
}

pub fn namespace() -> Namespace {
    Namespace::new(DATABASE, COLLECTION)
}

pub fn spec() -> DesiredDocumentSpec {
    DesiredDocumentSpec::new(ENDPOINT, DATABASE, COLLECTION)
}

pub fn spec_with_content(content: &str) -> DesiredDocumentSpec {
    spec().with_content(content)
}

pub fn model(content: Option<&str>) -> DocumentResourceModel {
    DocumentResourceModel {
        connection_uri: ENDPOINT.to_string(),
        database: DATABASE.to_string(),
        collection: COLLECTION.to_string(),
        content: content.map(ToString::to_string),
        ..DocumentResourceModel::default()
    }
}

/// Parse JSON text for structural comparison
pub fn json(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("test content should be valid JSON")
}
