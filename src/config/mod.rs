//! # Provider Configuration
//!
//! Process-level settings loaded from environment variables.
//!
//! Per-resource settings (endpoint, credentials, namespace) never live here:
//! they arrive with every lifecycle call. This module only covers how the
//! process logs, records metrics, and reaches its backing services.

use std::time::Duration;

use crate::constants::{DEFAULT_APP_NAME, DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL};

/// Provider-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Log filter used when `RUST_LOG` is not set (`MONGODOCS_LOG_LEVEL`)
    pub log_level: String,
    /// Log format, `text` or `json` (`MONGODOCS_LOG_FORMAT`)
    pub log_format: String,
    /// Record and register Prometheus metrics (`MONGODOCS_ENABLE_METRICS`)
    pub enable_metrics: bool,
    /// Document store connection settings
    pub store: StoreSettings,
    /// Secret store settings
    pub secrets: SecretsSettings,
}

/// Settings applied to every document store connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Connect and server-selection timeout (`MONGODOCS_STORE_TIMEOUT_SECS`).
    /// `None` keeps the driver default.
    pub timeout: Option<Duration>,
    /// Application name reported in the store's connection metadata (`MONGODOCS_APP_NAME`)
    pub app_name: String,
}

/// Settings for the AWS Secrets Manager client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsSettings {
    /// Region override (`MONGODOCS_SECRETS_REGION`). `None` uses the default region chain.
    pub region: Option<String>,
    /// Endpoint override for local stacks (`MONGODOCS_SECRETS_ENDPOINT`)
    pub endpoint: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            enable_metrics: true,
            store: StoreSettings::default(),
            secrets: SecretsSettings::default(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: env_var_or_default_str("MONGODOCS_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            log_format: env_var_or_default_str("MONGODOCS_LOG_FORMAT", DEFAULT_LOG_FORMAT),
            enable_metrics: env_var_or_default_bool("MONGODOCS_ENABLE_METRICS", true),
            store: StoreSettings {
                timeout: env_var_opt::<u64>("MONGODOCS_STORE_TIMEOUT_SECS")
                    .map(Duration::from_secs),
                app_name: env_var_or_default_str("MONGODOCS_APP_NAME", DEFAULT_APP_NAME),
            },
            secrets: SecretsSettings {
                region: env_var_non_empty("MONGODOCS_SECRETS_REGION"),
                endpoint: env_var_non_empty("MONGODOCS_SECRETS_ENDPOINT"),
            },
        }
    }

    /// Whether logs should be emitted as JSON lines
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Read environment variable and parse it, ignoring unset or unparsable values
fn env_var_opt<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |v| parse_bool(&v))
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read environment variable, treating an empty value as unset
fn env_var_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    let v_lower = value.trim().to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}
