//! # MongoDB Connector
//!
//! [`StoreConnector`] backed by the official MongoDB driver.
//!
//! Each session owns its own `Client`; it is shut down when the session is
//! closed. Identifier encoding is handled entirely here:
//! - an `ObjectId` `_id` is rendered as its 24-character hex string
//! - a string `_id` is used verbatim
//! - any other `_id` is rendered as relaxed extended JSON
//!
//! A token can stand for more than one `_id` (a 24-hex string and the
//! `ObjectId` with the same hex, or `"42"` and the integer 42). Each
//! operation first resolves the token to the one stored `_id` it names,
//! trying interpretations in a fixed order: `ObjectId`, then the typed
//! extended JSON value, then the plain string. Replace and delete then act on
//! that exact `_id` only, so two documents sharing a rendering are never
//! confused within one operation.

use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde_json::Value;
use tracing::{debug, warn};

use super::{StoreConnector, StoreError, StoreSession};
use crate::config::StoreSettings;
use crate::constants::PING_DATABASE;
use crate::model::{ConnectionTarget, DocumentId, Namespace};

/// MongoDB store connector
#[derive(Debug, Clone, Default)]
pub struct MongoConnector {
    settings: StoreSettings,
}

impl MongoConnector {
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self { settings }
    }

    async fn client_options(&self, target: &ConnectionTarget) -> Result<ClientOptions, StoreError> {
        let mut options = ClientOptions::parse(target.endpoint.as_str())
            .await
            .map_err(|e| StoreError::Connect(format!("invalid connection string: {e}")))?;

        // Keep auth source/mechanism from the connection string, override the identity
        if let Some(credentials) = &target.credentials {
            let mut credential = options.credential.take().unwrap_or_default();
            credential.username = Some(credentials.username().to_string());
            credential.password = Some(credentials.password().to_string());
            options.credential = Some(credential);
        }

        if let Some(timeout) = self.settings.timeout {
            options.server_selection_timeout = Some(timeout);
            options.connect_timeout = Some(timeout);
        }
        if options.app_name.is_none() {
            options.app_name = Some(self.settings.app_name.clone());
        }

        Ok(options)
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn StoreSession>, StoreError> {
        let options = self.client_options(target).await?;
        let client = Client::with_options(options)
            .map_err(|e| StoreError::Connect(format!("unable to create client: {e}")))?;

        if let Err(e) = client
            .database(PING_DATABASE)
            .run_command(doc! { "ping": 1 })
            .await
        {
            warn!(error = %e, "MongoDB liveness probe failed");
            client.shutdown().await;
            return Err(StoreError::Connect(format!("failed to ping MongoDB: {e}")));
        }

        debug!("MongoDB connection established");
        Ok(Box::new(MongoSession { client }))
    }
}

struct MongoSession {
    client: Client,
}

impl MongoSession {
    fn collection(&self, namespace: &Namespace) -> Collection<Document> {
        self.client
            .database(&namespace.database)
            .collection::<Document>(&namespace.collection)
    }
}

#[async_trait]
impl StoreSession for MongoSession {
    async fn insert(
        &self,
        namespace: &Namespace,
        document: Value,
    ) -> Result<DocumentId, StoreError> {
        let document = to_bson_document(&document)?;
        let result = self
            .collection(namespace)
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Operation(format!("unable to insert document: {e}")))?;
        Ok(render_id(result.inserted_id))
    }

    async fn find_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
    ) -> Result<Option<Value>, StoreError> {
        let collection = self.collection(namespace);
        for candidate in id_candidates(id) {
            let found = collection
                .find_one(doc! { "_id": candidate })
                .await
                .map_err(|e| StoreError::Operation(format!("unable to find document: {e}")))?;
            if let Some(document) = found {
                return Ok(Some(Bson::Document(document).into_relaxed_extjson()));
            }
        }
        Ok(None)
    }

    async fn replace_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
        document: Value,
    ) -> Result<(), StoreError> {
        let document = to_bson_document(&document)?;
        let collection = self.collection(namespace);
        let Some(stored_id) = resolve_id(&collection, id).await? else {
            return Err(StoreError::not_found(namespace, id));
        };
        let result = collection
            .replace_one(doc! { "_id": stored_id }, document)
            .await
            .map_err(|e| StoreError::Operation(format!("unable to replace document: {e}")))?;
        if result.matched_count == 0 {
            return Err(StoreError::not_found(namespace, id));
        }
        Ok(())
    }

    async fn delete_by_id(&self, namespace: &Namespace, id: &DocumentId) -> Result<(), StoreError> {
        let collection = self.collection(namespace);
        let Some(stored_id) = resolve_id(&collection, id).await? else {
            return Err(StoreError::not_found(namespace, id));
        };
        let result = collection
            .delete_one(doc! { "_id": stored_id })
            .await
            .map_err(|e| StoreError::Operation(format!("unable to delete document: {e}")))?;
        if result.deleted_count == 0 {
            return Err(StoreError::not_found(namespace, id));
        }
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.client.shutdown().await;
        debug!("MongoDB connection closed");
    }
}

fn to_bson_document(document: &Value) -> Result<Document, StoreError> {
    bson::to_document(document).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

/// Render a store-assigned `_id` as an identifier token
fn render_id(id: Bson) -> DocumentId {
    match id {
        Bson::ObjectId(oid) => DocumentId::new(oid.to_hex()),
        Bson::String(s) => DocumentId::new(s),
        other => DocumentId::new(other.into_relaxed_extjson().to_string()),
    }
}

/// Every `_id` a token can stand for, most specific first
fn id_candidates(id: &DocumentId) -> Vec<Bson> {
    let raw = id.as_str();
    let mut candidates = Vec::with_capacity(2);

    if let Ok(oid) = ObjectId::parse_str(raw) {
        candidates.push(Bson::ObjectId(oid));
    } else if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if !value.is_string() {
            if let Ok(bson) = bson::to_bson(&value) {
                candidates.push(bson);
            }
        }
    }

    candidates.push(Bson::String(raw.to_string()));
    candidates
}

/// The stored `_id` a token names, first match in candidate order
async fn resolve_id(
    collection: &Collection<Document>,
    id: &DocumentId,
) -> Result<Option<Bson>, StoreError> {
    for candidate in id_candidates(id) {
        let found = collection
            .find_one(doc! { "_id": candidate.clone() })
            .projection(doc! { "_id": 1 })
            .await
            .map_err(|e| StoreError::Operation(format!("unable to find document: {e}")))?;
        if found.is_some() {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
