//! # Resource Model
//!
//! The attribute set exchanged with the host for one `mongodocs_document`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{
    non_empty, Credentials, DesiredDocumentSpec, DocumentId, ManagedDocumentState,
};

/// Manages a MongoDB document
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentResourceModel {
    /// The unique identifier of the document
    #[serde(default)]
    pub id: Option<String>,

    /// MongoDB connection URI
    pub connection_uri: String,

    /// Name of the MongoDB database
    pub database: String,

    /// Name of the MongoDB collection
    pub collection: String,

    /// MongoDB username
    #[serde(default)]
    pub username: Option<String>,

    /// MongoDB password
    #[serde(default)]
    pub password: Option<String>,

    /// JSON content of the document
    #[serde(default)]
    pub content: Option<String>,

    /// AWS Secrets Manager secret name for document content
    #[serde(default)]
    pub secret_name: Option<String>,
}

impl std::fmt::Debug for DocumentResourceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentResourceModel")
            .field("id", &self.id)
            .field("connection_uri", &"***")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("content_len", &self.content.as_ref().map(String::len))
            .field("secret_name", &self.secret_name)
            .finish()
    }
}

impl DocumentResourceModel {
    /// Desired configuration declared by this model
    #[must_use]
    pub fn to_spec(&self) -> DesiredDocumentSpec {
        DesiredDocumentSpec {
            connection_endpoint: self.connection_uri.clone(),
            credentials: Credentials::from_parts(
                self.username.as_deref(),
                self.password.as_deref(),
            ),
            database: self.database.clone(),
            collection: self.collection.clone(),
            content: self.content.clone(),
            secret_name: self.secret_name.clone(),
        }
    }

    /// Tracked state held in this model, `None` when it carries no identifier
    #[must_use]
    pub fn to_state(&self) -> Option<ManagedDocumentState> {
        let identifier = non_empty(self.id.as_deref())?;
        Some(ManagedDocumentState::from_spec(
            &self.to_spec(),
            DocumentId::new(identifier),
            self.content.clone().unwrap_or_default(),
        ))
    }

    /// This model with the identifier and content of `state`
    #[must_use]
    pub fn tracking(&self, state: &ManagedDocumentState) -> Self {
        Self {
            id: Some(state.identifier.to_string()),
            content: Some(state.resolved_content.clone()),
            ..self.clone()
        }
    }
}
