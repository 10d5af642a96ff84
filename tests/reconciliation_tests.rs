//! # Reconciliation Tests
//!
//! Drives the Create/Read/Update/Delete state machine against the in-process
//! store and checks stored documents, tracked state, and session handling.

mod common;

use std::sync::Arc;

use common::{json, namespace, spec, spec_with_content, Harness};
use mongodocs_provider::model::{Credentials, DocumentId, ManagedDocumentState};
use mongodocs_provider::reconciler::{ReadOutcome, ReconcileError, StoreOperation};
use mongodocs_provider::secrets::{InMemorySecrets, SecretLookupError};
use mongodocs_provider::store::{MemoryStore, StoreError};
use serde_json::json as value;

fn untracked_state(id: &str) -> ManagedDocumentState {
    ManagedDocumentState::from_spec(
        &spec_with_content(r#"{"name":"a"}"#),
        DocumentId::new(id),
        r#"{"name":"a"}"#.to_string(),
    )
}

#[tokio::test]
async fn test_create_update_delete_read_scenario() {
    let h = Harness::new();

    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();
    assert!(!created.identifier.as_str().is_empty());
    assert_eq!(created.resolved_content, r#"{"name":"a"}"#);
    assert_eq!(created.database, "app");
    assert_eq!(created.collection, "docs");

    let updated = h
        .reconciler
        .update(&spec_with_content(r#"{"name":"b"}"#), &created)
        .await
        .unwrap();
    assert_eq!(updated.identifier, created.identifier);
    assert_eq!(updated.resolved_content, r#"{"name":"b"}"#);
    assert_eq!(
        h.store.document(&namespace(), &created.identifier).unwrap()["name"],
        "b"
    );

    h.reconciler.delete(&updated).await.unwrap();
    assert!(h.store.is_empty(&namespace()));

    let outcome = h.reconciler.read(&updated).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Removed);
}

#[tokio::test]
async fn test_create_then_read_round_trip() {
    let h = Harness::new();
    let content = r#"{"name": "a", "tags": ["x", "y"], "nested": {"b": 2, "a": 1}}"#;

    let created = h
        .reconciler
        .create(&spec_with_content(content))
        .await
        .unwrap();
    assert_eq!(created.resolved_content, content);

    let refreshed = h
        .reconciler
        .read(&created)
        .await
        .unwrap()
        .into_state()
        .unwrap();
    assert_eq!(json(&refreshed.resolved_content), json(content));
    assert_eq!(refreshed.identifier, created.identifier);
    // Canonical form: compact, keys sorted, store-assigned _id dropped
    assert_eq!(
        refreshed.resolved_content,
        r#"{"name":"a","nested":{"a":1,"b":2},"tags":["x","y"]}"#
    );
}

#[tokio::test]
async fn test_secret_content_wins_over_inline_content() {
    let secrets = InMemorySecrets::new().with_secret("doc-secret", r#"{"k":1}"#);
    let h = Harness::with(MemoryStore::new(), secrets);

    let desired = spec()
        .with_content(r#"{"unrelated":true}"#)
        .with_secret_name("doc-secret");
    let created = h.reconciler.create(&desired).await.unwrap();

    assert_eq!(created.resolved_content, r#"{"k":1}"#);
    assert_eq!(created.secret_name.as_deref(), Some("doc-secret"));
    let stored = h.store.document(&namespace(), &created.identifier).unwrap();
    assert_eq!(stored["k"], 1);
    assert!(stored.get("unrelated").is_none());
    assert_eq!(h.secrets.lookups(), 1);
}

#[tokio::test]
async fn test_update_switches_to_secret_content() {
    let h = Harness::new();
    h.secrets.insert("doc-secret", r#"{"from":"secret"}"#);

    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"from":"inline"}"#))
        .await
        .unwrap();
    let updated = h
        .reconciler
        .update(
            &spec_with_content(r#"{"from":"inline"}"#).with_secret_name("doc-secret"),
            &created,
        )
        .await
        .unwrap();

    assert_eq!(updated.resolved_content, r#"{"from":"secret"}"#);
    assert_eq!(
        h.store.document(&namespace(), &created.identifier).unwrap()["from"],
        "secret"
    );
}

#[tokio::test]
async fn test_missing_content_create_opens_no_session() {
    let h = Harness::new();

    let result = h
        .reconciler
        .create(&spec().with_content("").with_secret_name(""))
        .await;

    assert!(matches!(result, Err(ReconcileError::MissingContent)));
    assert_eq!(h.store.sessions_opened(), 0);
    assert_eq!(h.store.store_calls(), 0);
}

#[tokio::test]
async fn test_missing_content_update_opens_no_session() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();
    let opened = h.store.sessions_opened();

    let result = h.reconciler.update(&spec(), &created).await;

    assert!(matches!(result, Err(ReconcileError::MissingContent)));
    assert_eq!(h.store.sessions_opened(), opened);
    assert_eq!(
        h.store.document(&namespace(), &created.identifier).unwrap()["name"],
        "a"
    );
}

#[tokio::test]
async fn test_secret_lookup_failure_opens_no_session() {
    let h = Harness::new();

    let result = h
        .reconciler
        .create(&spec_with_content(r#"{"a":1}"#).with_secret_name("missing"))
        .await;

    assert!(matches!(
        result,
        Err(ReconcileError::SecretLookup(SecretLookupError::NotFound { .. }))
    ));
    assert_eq!(h.store.sessions_opened(), 0);
}

#[tokio::test]
async fn test_invalid_content_rejected_before_store_call() {
    let h = Harness::new();

    for content in ["[1,2,3]", "not json", "42", "   "] {
        let result = h.reconciler.create(&spec_with_content(content)).await;
        assert!(
            matches!(result, Err(ReconcileError::InvalidContent(_))),
            "{content:?} should be invalid"
        );
    }
    assert_eq!(h.store.sessions_opened(), 0);
    assert!(h.store.is_empty(&namespace()));
}

#[tokio::test]
async fn test_invalid_secret_payload_is_invalid_content() {
    let secrets = InMemorySecrets::new().with_secret("blank", "");
    let h = Harness::with(MemoryStore::new(), secrets);

    let result = h
        .reconciler
        .create(&spec_with_content(r#"{"a":1}"#).with_secret_name("blank"))
        .await;

    assert!(matches!(result, Err(ReconcileError::InvalidContent(_))));
}

#[tokio::test]
async fn test_read_unknown_identifier_is_removed() {
    let h = Harness::new();

    let outcome = h.reconciler.read(&untracked_state("missing")).await.unwrap();

    assert_eq!(outcome, ReadOutcome::Removed);
    assert_eq!(h.store.open_sessions(), 0);
}

#[tokio::test]
async fn test_update_unknown_identifier_is_not_found() {
    let h = Harness::new();

    let result = h
        .reconciler
        .update(&spec_with_content(r#"{"name":"b"}"#), &untracked_state("missing"))
        .await;

    match result {
        Err(ReconcileError::NotFoundOnUpdate { identifier }) => {
            assert_eq!(identifier.as_str(), "missing");
        }
        other => panic!("expected NotFoundOnUpdate, got {other:?}"),
    }
    // Never downgraded to a create
    assert!(h.store.is_empty(&namespace()));
}

#[tokio::test]
async fn test_delete_twice_succeeds() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();

    h.reconciler.delete(&created).await.unwrap();
    h.reconciler.delete(&created).await.unwrap();
    assert!(h.store.is_empty(&namespace()));
}

#[tokio::test]
async fn test_read_reflects_out_of_band_change() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();

    h.store.put_out_of_band(
        &namespace(),
        &created.identifier,
        value!({"name": "changed", "extra": 1}),
    );

    let refreshed = h
        .reconciler
        .read(&created)
        .await
        .unwrap()
        .into_state()
        .unwrap();
    assert_eq!(refreshed.resolved_content, r#"{"extra":1,"name":"changed"}"#);
    assert_eq!(refreshed.identifier, created.identifier);
    assert_eq!(refreshed.namespace(), created.namespace());
    assert_eq!(refreshed.connection_endpoint, created.connection_endpoint);
}

#[tokio::test]
async fn test_read_after_out_of_band_delete_is_removed() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();

    h.store.remove_out_of_band(&namespace(), &created.identifier);

    assert_eq!(
        h.reconciler.read(&created).await.unwrap(),
        ReadOutcome::Removed
    );
}

#[tokio::test]
async fn test_declared_id_survives_read() {
    let h = Harness::new();
    let content = r#"{"_id":"fixed","name":"a"}"#;

    let created = h
        .reconciler
        .create(&spec_with_content(content))
        .await
        .unwrap();
    assert_eq!(created.identifier.as_str(), "fixed");

    let refreshed = h
        .reconciler
        .read(&created)
        .await
        .unwrap()
        .into_state()
        .unwrap();
    assert_eq!(refreshed.resolved_content, content);
}

#[tokio::test]
async fn test_update_cannot_change_stored_identifier() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();
    let before = h.store.document(&namespace(), &created.identifier);

    let result = h
        .reconciler
        .update(&spec_with_content(r#"{"_id":"other","name":"b"}"#), &created)
        .await;

    assert!(matches!(
        result,
        Err(ReconcileError::StoreOperation {
            operation: StoreOperation::Replace,
            ..
        })
    ));
    assert_eq!(h.store.document(&namespace(), &created.identifier), before);
    assert!(h
        .store
        .document(&namespace(), &DocumentId::new("other"))
        .is_none());
    assert_eq!(h.store.open_sessions(), 0);
}

#[tokio::test]
async fn test_update_to_other_collection_is_not_found() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();

    let mut moved = spec_with_content(r#"{"name":"a"}"#);
    moved.collection = "archive".to_string();
    let result = h.reconciler.update(&moved, &created).await;

    assert!(matches!(
        result,
        Err(ReconcileError::NotFoundOnUpdate { .. })
    ));
    assert!(h.store.document(&namespace(), &created.identifier).is_some());
}

#[tokio::test]
async fn test_sessions_released_on_success_and_error() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();
    h.reconciler.read(&created).await.unwrap();
    h.reconciler
        .update(&spec_with_content(r#"{"name":"b"}"#), &created)
        .await
        .unwrap();
    h.reconciler.read(&untracked_state("missing")).await.unwrap();
    let _ = h
        .reconciler
        .update(&spec_with_content(r#"{"a":1}"#), &untracked_state("missing"))
        .await;
    h.reconciler.delete(&created).await.unwrap();
    h.reconciler.delete(&created).await.unwrap();

    h.store.set_operation_failure(Some("not primary"));
    let _ = h.reconciler.create(&spec_with_content(r#"{"a":1}"#)).await;
    let _ = h.reconciler.read(&created).await;
    let _ = h
        .reconciler
        .update(&spec_with_content(r#"{"a":1}"#), &created)
        .await;
    let _ = h.reconciler.delete(&created).await;

    assert_eq!(h.store.sessions_opened(), 11);
    assert_eq!(h.store.open_sessions(), 0);
}

#[tokio::test]
async fn test_store_failures_are_labelled_by_operation() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();
    h.store.set_operation_failure(Some("not primary"));

    let create = h.reconciler.create(&spec_with_content(r#"{"a":1}"#)).await;
    let read = h.reconciler.read(&created).await;
    let update = h
        .reconciler
        .update(&spec_with_content(r#"{"a":1}"#), &created)
        .await;
    let delete = h.reconciler.delete(&created).await;

    let operation = |e: ReconcileError| match e {
        ReconcileError::StoreOperation {
            operation,
            source: StoreError::Operation(message),
        } => {
            assert_eq!(message, "not primary");
            operation
        }
        other => panic!("expected StoreOperation, got {other:?}"),
    };
    assert_eq!(operation(create.unwrap_err()), StoreOperation::Insert);
    assert_eq!(operation(read.unwrap_err()), StoreOperation::Find);
    assert_eq!(operation(update.unwrap_err()), StoreOperation::Replace);
    assert_eq!(operation(delete.unwrap_err()), StoreOperation::Delete);
}

#[tokio::test]
async fn test_connection_failure_aborts_before_mutation() {
    let h = Harness::new();
    let created = h
        .reconciler
        .create(&spec_with_content(r#"{"name":"a"}"#))
        .await
        .unwrap();
    let calls = h.store.store_calls();
    h.store.set_unreachable(true);

    let results = [
        h.reconciler
            .create(&spec_with_content(r#"{"name":"x"}"#))
            .await
            .err(),
        h.reconciler.read(&created).await.err(),
        h.reconciler
            .update(&spec_with_content(r#"{"name":"x"}"#), &created)
            .await
            .err(),
        h.reconciler.delete(&created).await.err(),
    ];

    for result in results {
        assert!(matches!(result, Some(ReconcileError::Connection(_))));
    }
    assert_eq!(h.store.store_calls(), calls);
    assert_eq!(h.store.len(&namespace()), 1);
    assert_eq!(
        h.store.document(&namespace(), &created.identifier).unwrap()["name"],
        "a"
    );
}

#[tokio::test]
async fn test_malformed_endpoint_is_connection_error() {
    let h = Harness::new();
    let mut desired = spec_with_content(r#"{"a":1}"#);
    desired.connection_endpoint = "localhost".to_string();

    let result = h.reconciler.create(&desired).await;

    assert!(matches!(result, Err(ReconcileError::Connection(_))));
    assert_eq!(h.store.sessions_opened(), 0);
}

#[tokio::test]
async fn test_credentials_applied_only_as_pair() {
    let required = Credentials::from_parts(Some("admin"), Some("s3cret")).unwrap();
    let h = Harness::with(
        MemoryStore::new().with_required_credentials(required),
        InMemorySecrets::new(),
    );

    let lone_username = spec_with_content(r#"{"a":1}"#)
        .with_credentials(Credentials::from_parts(Some("admin"), None));
    assert!(matches!(
        h.reconciler.create(&lone_username).await,
        Err(ReconcileError::Connection(_))
    ));

    let paired = spec_with_content(r#"{"a":1}"#)
        .with_credentials(Credentials::from_parts(Some("admin"), Some("s3cret")));
    let created = h.reconciler.create(&paired).await.unwrap();
    assert!(created.credentials.is_some());

    // Later operations reuse the tracked credentials
    h.reconciler.read(&created).await.unwrap();
    h.reconciler.delete(&created).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_operations_are_independent() {
    let h = Harness::new();
    let reconciler = Arc::new(h.reconciler.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let reconciler = Arc::clone(&reconciler);
            tokio::spawn(async move {
                reconciler
                    .create(&spec_with_content(&format!(r#"{{"n":{i}}}"#)))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().identifier);
    }
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(h.store.len(&namespace()), 8);
    assert_eq!(h.store.open_sessions(), 0);
}
