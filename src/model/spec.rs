//! # Desired Document Spec

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{non_empty, ConnectionTarget, Namespace};

/// Username and password for the document store
///
/// Only ever constructed as a complete pair; see [`Credentials::from_parts`].
/// Deserialization applies the same check. There is no `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(try_from = "RawCredentials")]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Build credentials when both parts are present and non-empty.
    ///
    /// A lone username or password is ignored: the store is then contacted
    /// with whatever the connection string itself carries.
    #[must_use]
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (non_empty(username), non_empty(password)) {
            (Some(username), Some(password)) => Some(Self {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct RawCredentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = &'static str;

    fn try_from(raw: RawCredentials) -> Result<Self, Self::Error> {
        Self::from_parts(Some(&raw.username), Some(&raw.password))
            .ok_or("credentials need a non-empty username and password")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The declared configuration for one managed document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DesiredDocumentSpec {
    /// Store connection string
    pub connection_endpoint: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    pub database: String,
    pub collection: String,
    /// Inline JSON payload
    #[serde(default)]
    pub content: Option<String>,
    /// Secret holding the JSON payload; wins over `content` when non-empty
    #[serde(default)]
    pub secret_name: Option<String>,
}

impl DesiredDocumentSpec {
    pub fn new(
        connection_endpoint: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            connection_endpoint: connection_endpoint.into(),
            credentials: None,
            database: database.into(),
            collection: collection.into(),
            content: None,
            secret_name: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_secret_name(mut self, secret_name: impl Into<String>) -> Self {
        self.secret_name = Some(secret_name.into());
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
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
