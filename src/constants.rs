//! # Constants
//!
//! Shared constants used throughout the provider.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable (see [`crate::config`]).

/// Provider type name reported to the orchestration host
pub const PROVIDER_TYPE_NAME: &str = "mongodocs";

/// Resource type name of the managed document resource
pub const DOCUMENT_RESOURCE_TYPE: &str = "mongodocs_document";

/// Database used for the liveness probe issued when a store connection opens
pub const PING_DATABASE: &str = "admin";

/// Name of the identifier field MongoDB assigns to every document
pub const DOCUMENT_ID_FIELD: &str = "_id";

/// Default log filter when neither `RUST_LOG` nor `MONGODOCS_LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Application name reported to the document store
pub const DEFAULT_APP_NAME: &str = "mongodocs";

/// Histogram buckets for store round trips (seconds)
pub const OPERATION_DURATION_BUCKETS: [f64; 7] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0];
