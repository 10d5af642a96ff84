//! # Reconciliation Engine
//!
//! Create/Read/Update/Delete of one managed document.
//!
//! Every operation is a single pass: resolve content (Create and Update),
//! open a fresh store session, perform one store call, close the session,
//! and hand back the resulting state. Nothing is retried and nothing is
//! cached between calls.
//!
//! Not-found is treated differently per operation:
//!
//! | Operation | Document missing                         |
//! |-----------|------------------------------------------|
//! | Read      | [`ReadOutcome::Removed`]                 |
//! | Update    | [`ReconcileError::NotFoundOnUpdate`]     |
//! | Delete    | success                                  |

mod content;
mod document;
mod error;

pub use content::{resolve_content, ContentSource, ResolvedContent};
pub use document::{canonicalize, parse_document};
pub use error::{ReconcileError, StoreOperation};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::model::{ConnectionTarget, DesiredDocumentSpec, ManagedDocumentState};
use crate::observability::metrics;
use crate::secrets::SecretSource;
use crate::store::{StoreConnector, StoreError, StoreSession};

/// Lifecycle operation, used for span names and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Result of refreshing a tracked document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The document exists; content reflects what the store holds
    Present(ManagedDocumentState),
    /// The document is gone and should be dropped from tracked state
    Removed,
}

impl ReadOutcome {
    #[must_use]
    pub fn into_state(self) -> Option<ManagedDocumentState> {
        match self {
            Self::Present(state) => Some(state),
            Self::Removed => None,
        }
    }
}

/// Drives lifecycle operations against a store and a secret source
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn StoreConnector>,
    secrets: Arc<dyn SecretSource>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(store: Arc<dyn StoreConnector>, secrets: Arc<dyn SecretSource>) -> Self {
        Self { store, secrets }
    }

    /// Insert the document declared by `spec`.
    ///
    /// # Errors
    ///
    /// Content errors are raised before any session is opened. Store errors
    /// leave nothing behind to track.
    pub async fn create(
        &self,
        spec: &DesiredDocumentSpec,
    ) -> Result<ManagedDocumentState, ReconcileError> {
        let span = info_span!(
            "document.create",
            database = %spec.database,
            collection = %spec.collection,
        );
        timed(Operation::Create, self.create_inner(spec).instrument(span)).await
    }

    /// Refresh tracked state from the store.
    ///
    /// # Errors
    ///
    /// Connection and find failures. A missing document is not an error.
    pub async fn read(&self, state: &ManagedDocumentState) -> Result<ReadOutcome, ReconcileError> {
        let span = info_span!(
            "document.read",
            database = %state.database,
            collection = %state.collection,
            document.id = %state.identifier,
        );
        timed(Operation::Read, self.read_inner(state).instrument(span)).await
    }

    /// Replace the tracked document with the content declared by `spec`.
    ///
    /// The connection and namespace come from `spec`, the identifier from
    /// `state`.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::NotFoundOnUpdate`] when the tracked document no
    /// longer exists; it is never recreated here.
    pub async fn update(
        &self,
        spec: &DesiredDocumentSpec,
        state: &ManagedDocumentState,
    ) -> Result<ManagedDocumentState, ReconcileError> {
        let span = info_span!(
            "document.update",
            database = %spec.database,
            collection = %spec.collection,
            document.id = %state.identifier,
        );
        timed(Operation::Update, self.update_inner(spec, state).instrument(span)).await
    }

    /// Delete the tracked document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Connection and delete failures.
    pub async fn delete(&self, state: &ManagedDocumentState) -> Result<(), ReconcileError> {
        let span = info_span!(
            "document.delete",
            database = %state.database,
            collection = %state.collection,
            document.id = %state.identifier,
        );
        timed(Operation::Delete, self.delete_inner(state).instrument(span)).await
    }

    async fn create_inner(
        &self,
        spec: &DesiredDocumentSpec,
    ) -> Result<ManagedDocumentState, ReconcileError> {
        let resolved = resolve_content(spec, self.secrets.as_ref()).await?;
        let document = parse_document(&resolved.text)?;

        let session = self.open(&spec.connection_target()).await?;
        let inserted = session.insert(&spec.namespace(), document).await;
        session.close().await;

        let identifier =
            inserted.map_err(|e| ReconcileError::store(StoreOperation::Insert, e))?;
        info!(
            document.id = %identifier,
            content.source = resolved.source.as_str(),
            "Document created"
        );
        Ok(ManagedDocumentState::from_spec(spec, identifier, resolved.text))
    }

    async fn read_inner(&self, state: &ManagedDocumentState) -> Result<ReadOutcome, ReconcileError> {
        let session = self.open(&state.connection_target()).await?;
        let found = session
            .find_by_id(&state.namespace(), &state.identifier)
            .await;
        session.close().await;

        match found.map_err(|e| ReconcileError::store(StoreOperation::Find, e))? {
            Some(document) => {
                let content = canonicalize(document, &state.resolved_content);
                if content != state.resolved_content {
                    debug!("Stored content differs from tracked content");
                }
                Ok(ReadOutcome::Present(state.with_content(content)))
            }
            None => {
                warn!("Document not found in store, removing from state");
                metrics::increment_drift_detected(Operation::Read.as_str());
                Ok(ReadOutcome::Removed)
            }
        }
    }

    async fn update_inner(
        &self,
        spec: &DesiredDocumentSpec,
        state: &ManagedDocumentState,
    ) -> Result<ManagedDocumentState, ReconcileError> {
        let resolved = resolve_content(spec, self.secrets.as_ref()).await?;
        let document = parse_document(&resolved.text)?;

        let session = self.open(&spec.connection_target()).await?;
        let replaced = session
            .replace_by_id(&spec.namespace(), &state.identifier, document)
            .await;
        session.close().await;

        match replaced {
            Ok(()) => {
                info!(content.source = resolved.source.as_str(), "Document updated");
                Ok(ManagedDocumentState::from_spec(
                    spec,
                    state.identifier.clone(),
                    resolved.text,
                ))
            }
            Err(StoreError::NotFound { .. }) => {
                metrics::increment_drift_detected(Operation::Update.as_str());
                Err(ReconcileError::NotFoundOnUpdate {
                    identifier: state.identifier.clone(),
                })
            }
            Err(e) => Err(ReconcileError::store(StoreOperation::Replace, e)),
        }
    }

    async fn delete_inner(&self, state: &ManagedDocumentState) -> Result<(), ReconcileError> {
        let session = self.open(&state.connection_target()).await?;
        let deleted = session
            .delete_by_id(&state.namespace(), &state.identifier)
            .await;
        session.close().await;

        match deleted {
            Ok(()) => {
                info!("Document deleted");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => {
                info!("Document already absent, nothing to delete");
                Ok(())
            }
            Err(e) => Err(ReconcileError::store(StoreOperation::Delete, e)),
        }
    }

    async fn open(
        &self,
        target: &ConnectionTarget,
    ) -> Result<Box<dyn StoreSession>, ReconcileError> {
        let session = self
            .store
            .open(target)
            .await
            .map_err(ReconcileError::Connection)?;
        metrics::increment_store_sessions_opened();
        Ok(session)
    }
}

/// Run an operation and record its duration and outcome
async fn timed<T>(
    operation: Operation,
    future: impl std::future::Future<Output = Result<T, ReconcileError>>,
) -> Result<T, ReconcileError> {
    let start = Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();
    metrics::record_operation(operation.as_str(), duration, result.is_ok());
    if let Err(e) = &result {
        warn!(
            operation = operation.as_str(),
            error = %e,
            duration_ms = start.elapsed().as_millis(),
            "Lifecycle operation failed"
        );
    }
    result
}
