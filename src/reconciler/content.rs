//! # Content Resolution
//!
//! Picks the document payload for Create and Update.
//!
//! A non-empty `secret_name` always wins; inline `content` is only used when
//! no secret is named. The payload is returned verbatim and not parsed here.

use tracing::debug;

use super::ReconcileError;
use crate::model::{non_empty, DesiredDocumentSpec};
use crate::observability::metrics;
use crate::secrets::{SecretLookupError, SecretSource};

/// Where resolved content came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Inline,
    Secret { name: String },
}

impl ContentSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Secret { .. } => "secret",
        }
    }
}

/// Document payload together with its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub text: String,
    pub source: ContentSource,
}

/// Resolve the payload declared by `spec`.
///
/// # Errors
///
/// - [`ReconcileError::SecretLookup`] when the named secret cannot be read
/// - [`ReconcileError::MissingContent`] when neither source is set
pub async fn resolve_content(
    spec: &DesiredDocumentSpec,
    secrets: &dyn SecretSource,
) -> Result<ResolvedContent, ReconcileError> {
    if let Some(name) = non_empty(spec.secret_name.as_deref()) {
        let result = secrets.fetch(name).await;
        metrics::record_secret_lookup(lookup_outcome(&result));
        let text = result?;
        debug!(secret_name = name, "Resolved document content from secret");
        return Ok(ResolvedContent {
            text,
            source: ContentSource::Secret {
                name: name.to_string(),
            },
        });
    }

    match non_empty(spec.content.as_deref()) {
        Some(content) => Ok(ResolvedContent {
            text: content.to_string(),
            source: ContentSource::Inline,
        }),
        None => Err(ReconcileError::MissingContent),
    }
}

fn lookup_outcome(result: &Result<String, SecretLookupError>) -> &'static str {
    match result {
        Ok(_) => "found",
        Err(SecretLookupError::NotFound { .. }) => "not_found",
        Err(SecretLookupError::Empty { .. }) => "empty",
        Err(SecretLookupError::Backend { .. }) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::InMemorySecrets;

    fn spec() -> DesiredDocumentSpec {
        DesiredDocumentSpec::new("store://local", "app", "docs")
    }

    #[tokio::test]
    async fn test_secret_wins_over_inline_content() {
        let secrets = InMemorySecrets::new().with_secret("doc-secret", r#"{"k":1}"#);
        let spec = spec()
            .with_content(r#"{"name":"ignored"}"#)
            .with_secret_name("doc-secret");

        let resolved = resolve_content(&spec, &secrets).await.unwrap();
        assert_eq!(resolved.text, r#"{"k":1}"#);
        assert_eq!(
            resolved.source,
            ContentSource::Secret {
                name: "doc-secret".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_inline_content_used_without_secret() {
        let secrets = InMemorySecrets::new();
        let spec = spec().with_content(r#"{"name":"a"}"#);

        let resolved = resolve_content(&spec, &secrets).await.unwrap();
        assert_eq!(resolved.text, r#"{"name":"a"}"#);
        assert_eq!(resolved.source, ContentSource::Inline);
        assert_eq!(secrets.lookups(), 0);
    }

    #[tokio::test]
    async fn test_empty_secret_name_falls_back_to_content() {
        let secrets = InMemorySecrets::new();
        let spec = spec().with_content(r#"{"a":1}"#).with_secret_name("");

        let resolved = resolve_content(&spec, &secrets).await.unwrap();
        assert_eq!(resolved.source, ContentSource::Inline);
        assert_eq!(secrets.lookups(), 0);
    }

    #[tokio::test]
    async fn test_missing_content() {
        let secrets = InMemorySecrets::new();
        let spec = spec().with_content("").with_secret_name("");

        let result = resolve_content(&spec, &secrets).await;
        assert!(matches!(result, Err(ReconcileError::MissingContent)));
    }

    #[tokio::test]
    async fn test_empty_secret_value_returned_verbatim() {
        let secrets = InMemorySecrets::new().with_secret("blank", "");
        let spec = spec().with_content(r#"{"a":1}"#).with_secret_name("blank");

        let resolved = resolve_content(&spec, &secrets).await.unwrap();
        assert_eq!(resolved.text, "");
    }

    #[tokio::test]
    async fn test_unknown_secret_is_lookup_error() {
        let secrets = InMemorySecrets::new();
        let spec = spec().with_secret_name("missing");

        let result = resolve_content(&spec, &secrets).await;
        assert!(matches!(
            result,
            Err(ReconcileError::SecretLookup(SecretLookupError::NotFound { .. }))
        ));
    }
}
