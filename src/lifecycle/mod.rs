//! # Lifecycle Boundary
//!
//! Host contract for the `mongodocs_document` resource.
//!
//! A [`LifecycleRequest`] names one operation and carries the plan and/or
//! prior state as [`DocumentResourceModel`]s. [`handle`] runs it through the
//! [`Reconciler`] and turns the outcome into a [`LifecycleResponse`].
//!
//! On failure the response carries the prior state untouched (Read, Update,
//! Delete) or no state at all (Create), plus one error diagnostic.

mod diagnostics;
mod model;
pub mod schema;

pub use diagnostics::{Diagnostic, Severity};
pub use model::DocumentResourceModel;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reconciler::{Operation, ReadOutcome, Reconciler};

const MISSING_IDENTIFIER: &str = "Missing Document Identifier";

/// One lifecycle call from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum LifecycleRequest {
    Create {
        plan: DocumentResourceModel,
    },
    Read {
        state: DocumentResourceModel,
    },
    Update {
        plan: DocumentResourceModel,
        state: DocumentResourceModel,
    },
    Delete {
        state: DocumentResourceModel,
    },
}

impl LifecycleRequest {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Read { .. } => Operation::Read,
            Self::Update { .. } => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
        }
    }
}

/// Result of a lifecycle call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleResponse {
    /// Resulting state; `None` after Delete, after a failed Create, or when removed
    #[serde(default)]
    pub state: Option<DocumentResourceModel>,
    /// Set when Read found the document gone and the host should drop it
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl LifecycleResponse {
    fn with_state(state: DocumentResourceModel) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    fn removed() -> Self {
        Self {
            removed: true,
            ..Self::default()
        }
    }

    fn failed(state: Option<DocumentResourceModel>, diagnostic: Diagnostic) -> Self {
        Self {
            state,
            removed: false,
            diagnostics: vec![diagnostic],
        }
    }

    /// Whether any error diagnostic was produced
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Run one lifecycle request
pub async fn handle(reconciler: &Reconciler, request: LifecycleRequest) -> LifecycleResponse {
    debug!(operation = request.operation().as_str(), "Handling lifecycle request");

    match request {
        LifecycleRequest::Create { plan } => match reconciler.create(&plan.to_spec()).await {
            Ok(created) => LifecycleResponse::with_state(plan.tracking(&created)),
            Err(e) => LifecycleResponse::failed(None, Diagnostic::from(&e)),
        },

        LifecycleRequest::Read { state } => {
            let Some(tracked) = state.to_state() else {
                return missing_identifier(state);
            };
            match reconciler.read(&tracked).await {
                Ok(ReadOutcome::Present(refreshed)) => {
                    LifecycleResponse::with_state(state.tracking(&refreshed))
                }
                Ok(ReadOutcome::Removed) => LifecycleResponse::removed(),
                Err(e) => LifecycleResponse::failed(Some(state), Diagnostic::from(&e)),
            }
        }

        LifecycleRequest::Update { plan, state } => {
            let Some(tracked) = state.to_state() else {
                return missing_identifier(state);
            };
            match reconciler.update(&plan.to_spec(), &tracked).await {
                Ok(updated) => LifecycleResponse::with_state(plan.tracking(&updated)),
                Err(e) => LifecycleResponse::failed(Some(state), Diagnostic::from(&e)),
            }
        }

        LifecycleRequest::Delete { state } => {
            let Some(tracked) = state.to_state() else {
                // Nothing was ever created, so there is nothing to remove
                return LifecycleResponse {
                    diagnostics: vec![Diagnostic::warning(
                        MISSING_IDENTIFIER,
                        "State carries no document id; nothing was deleted",
                    )],
                    ..LifecycleResponse::default()
                };
            };
            match reconciler.delete(&tracked).await {
                Ok(()) => LifecycleResponse::default(),
                Err(e) => LifecycleResponse::failed(Some(state), Diagnostic::from(&e)),
            }
        }
    }
}

fn missing_identifier(state: DocumentResourceModel) -> LifecycleResponse {
    LifecycleResponse::failed(
        Some(state),
        Diagnostic::error(
            MISSING_IDENTIFIER,
            "State carries no document id; the resource must be created first",
        ),
    )
}
