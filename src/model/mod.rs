//! # Document Model
//!
//! Types describing a managed document: what the host declares
//! ([`DesiredDocumentSpec`]) and what is tracked between calls
//! ([`ManagedDocumentState`]).

mod spec;
mod state;

pub use spec::{Credentials, DesiredDocumentSpec};
pub use state::{DocumentId, ManagedDocumentState};

/// Returns the value only when it is present and non-empty.
///
/// Optional attributes arrive from the host as `Option<String>`; an empty
/// string is a set-but-blank value and must never count as a usable source.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Connection parameters for one store session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub endpoint: String,
    pub credentials: Option<Credentials>,
}

/// Database and collection a document lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}
