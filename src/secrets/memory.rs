//! # In-Memory Secrets
//!
//! Fixed map of secret names to values. Lookups are counted so tests can
//! assert whether the secret store was consulted at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::{SecretLookupError, SecretSource};

#[derive(Debug, Clone, Default)]
pub struct InMemorySecrets {
    values: Arc<RwLock<HashMap<String, String>>>,
    lookups: Arc<AtomicUsize>,
}

impl InMemorySecrets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    /// Number of lookups performed so far
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretSource for InMemorySecrets {
    async fn fetch(&self, secret_name: &str) -> Result<String, SecretLookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(secret_name)
            .cloned()
            .ok_or_else(|| SecretLookupError::NotFound {
                name: secret_name.to_string(),
            })
    }
}
