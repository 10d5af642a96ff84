//! # In-Memory Store
//!
//! A [`StoreConnector`] that keeps documents in process memory.
//!
//! Used by the test suite and by embedders that want the lifecycle semantics
//! without a database. Beyond the store contract it can simulate an
//! unreachable server, required credentials, and failing operations, and it
//! counts sessions so callers can check that every session gets released.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{StoreConnector, StoreError, StoreSession};
use crate::constants::DOCUMENT_ID_FIELD;
use crate::model::{ConnectionTarget, Credentials, DocumentId, Namespace};

type Collection = BTreeMap<String, Value>;

/// In-process document store
///
/// Cloning is cheap and every clone shares the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: RwLock<HashMap<Namespace, Collection>>,
    required_credentials: RwLock<Option<Credentials>>,
    operation_failure: RwLock<Option<String>>,
    unreachable: AtomicBool,
    sessions_opened: AtomicUsize,
    sessions_released: AtomicUsize,
    store_calls: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject sessions that do not present exactly these credentials
    #[must_use]
    pub fn with_required_credentials(self, credentials: Credentials) -> Self {
        *self
            .inner
            .required_credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
        self
    }

    /// Make the liveness probe fail on open
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make every document operation fail with `message` (`None` clears it)
    pub fn set_operation_failure(&self, message: Option<&str>) {
        *self
            .inner
            .operation_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message.map(ToString::to_string);
    }

    /// Number of sessions opened so far
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.inner.sessions_opened.load(Ordering::SeqCst)
    }

    /// Number of sessions opened and not yet released
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.sessions_opened() - self.inner.sessions_released.load(Ordering::SeqCst)
    }

    /// Number of document operations attempted (insert/find/replace/delete)
    #[must_use]
    pub fn store_calls(&self) -> usize {
        self.inner.store_calls.load(Ordering::SeqCst)
    }

    /// Current stored document, read without a session
    #[must_use]
    pub fn document(&self, namespace: &Namespace, id: &DocumentId) -> Option<Value> {
        self.inner
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .and_then(|collection| collection.get(id.as_str()))
            .cloned()
    }

    /// Number of documents in a collection
    #[must_use]
    pub fn len(&self, namespace: &Namespace) -> usize {
        self.inner
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, namespace: &Namespace) -> bool {
        self.len(namespace) == 0
    }

    /// Remove a document behind the reconciler's back
    pub fn remove_out_of_band(&self, namespace: &Namespace, id: &DocumentId) -> Option<Value> {
        self.inner
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(namespace)
            .and_then(|collection| collection.remove(id.as_str()))
    }

    /// Overwrite a document behind the reconciler's back
    pub fn put_out_of_band(&self, namespace: &Namespace, id: &DocumentId, document: Value) {
        let document = with_id(document, id.as_str());
        self.inner
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(namespace.clone())
            .or_default()
            .insert(id.as_str().to_string(), document);
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn StoreSession>, StoreError> {
        match target.endpoint.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {}
            _ => {
                return Err(StoreError::Connect(format!(
                    "malformed endpoint {:?}",
                    target.endpoint
                )))
            }
        }

        if self.inner.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Connect(format!(
                "server at {} did not answer ping",
                target.endpoint
            )));
        }

        let required = self
            .inner
            .required_credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(required) = required {
            if target.credentials.as_ref() != Some(&required) {
                return Err(StoreError::Connect("authentication failed".to_string()));
            }
        }

        self.inner.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            inner: Arc::clone(&self.inner),
            released: AtomicBool::new(false),
        }))
    }
}

struct MemorySession {
    inner: Arc<Inner>,
    released: AtomicBool,
}

impl MemorySession {
    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.inner.sessions_released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn begin_call(&self) -> Result<(), StoreError> {
        self.inner.store_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .inner
            .operation_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match failure {
            Some(message) => Err(StoreError::Operation(message)),
            None => Ok(()),
        }
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn insert(
        &self,
        namespace: &Namespace,
        document: Value,
    ) -> Result<DocumentId, StoreError> {
        self.begin_call()?;
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }

        let id = document
            .get(DOCUMENT_ID_FIELD)
            .map_or_else(|| Uuid::new_v4().simple().to_string(), render_id);

        let mut collections = self
            .inner
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let collection = collections.entry(namespace.clone()).or_default();
        if collection.contains_key(&id) {
            return Err(StoreError::Operation(format!(
                "duplicate key error: {namespace} already holds _id {id}"
            )));
        }
        collection.insert(id.clone(), with_id(document, &id));
        Ok(DocumentId::new(id))
    }

    async fn find_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
    ) -> Result<Option<Value>, StoreError> {
        self.begin_call()?;
        Ok(self
            .inner
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .and_then(|collection| collection.get(id.as_str()))
            .cloned())
    }

    async fn replace_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
        document: Value,
    ) -> Result<(), StoreError> {
        self.begin_call()?;
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }

        if let Some(declared) = document.get(DOCUMENT_ID_FIELD) {
            if render_id(declared) != id.as_str() {
                return Err(StoreError::Operation(format!(
                    "replacement would modify the immutable field '{DOCUMENT_ID_FIELD}' \
                     (from {id} to {})",
                    render_id(declared)
                )));
            }
        }

        let mut collections = self
            .inner
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match collections
            .get_mut(namespace)
            .and_then(|collection| collection.get_mut(id.as_str()))
        {
            Some(existing) => {
                *existing = with_id(document, id.as_str());
                Ok(())
            }
            None => Err(StoreError::not_found(namespace, id)),
        }
    }

    async fn delete_by_id(&self, namespace: &Namespace, id: &DocumentId) -> Result<(), StoreError> {
        self.begin_call()?;
        self.inner
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(namespace)
            .and_then(|collection| collection.remove(id.as_str()))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(namespace, id))
    }

    async fn close(self: Box<Self>) {
        self.release();
    }
}

/// Identifier token for a declared `_id` value
fn render_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Store the identifier inside the document, as MongoDB does
fn with_id(mut document: Value, id: &str) -> Value {
    if let Value::Object(fields) = &mut document {
        if !fields.contains_key(DOCUMENT_ID_FIELD) {
            fields.insert(DOCUMENT_ID_FIELD.to_string(), Value::String(id.to_string()));
        }
    }
    document
}
