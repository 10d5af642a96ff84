//! MongoDB Document Provider Library
//!
//! Declarative lifecycle management for individual MongoDB documents.
//!
//! A host engine declares a document (namespace, connection, and content
//! sourced inline or from AWS Secrets Manager); this library creates, refreshes,
//! replaces, and deletes the matching stored document and tracks its
//! store-assigned identifier between calls.
//!
//! ## Quick Start
//!
//! ```rust
//! use mongodocs_provider::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod prelude;
pub mod reconciler;
pub mod secrets;
pub mod store;
