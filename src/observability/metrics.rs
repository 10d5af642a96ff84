//! # Metrics
//!
//! Prometheus metrics for lifecycle operations.
//!
//! ## Metrics Exposed
//!
//! - `mongodocs_operations_total{operation}` - Lifecycle operations run
//! - `mongodocs_operation_errors_total{operation}` - Lifecycle operations that failed
//! - `mongodocs_operation_duration_seconds{operation}` - Duration of lifecycle operations
//! - `mongodocs_drift_detected_total{operation}` - Documents found missing in the store
//! - `mongodocs_secret_lookups_total{outcome}` - Secret store lookups
//! - `mongodocs_store_sessions_opened_total` - Store sessions opened

use anyhow::Result;
use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

use crate::constants::OPERATION_DURATION_BUCKETS;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new("mongodocs_operations_total", "Total number of lifecycle operations"),
        &["operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "mongodocs_operation_errors_total",
            "Total number of failed lifecycle operations",
        ),
        &["operation"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "mongodocs_operation_duration_seconds",
            "Duration of lifecycle operations in seconds",
        )
        .buckets(OPERATION_DURATION_BUCKETS.to_vec()),
        &["operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static DRIFT_DETECTED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "mongodocs_drift_detected_total",
            "Total number of tracked documents found missing from the store",
        ),
        &["operation"],
    )
    .expect("Failed to create DRIFT_DETECTED_TOTAL metric - this should never happen")
});

static SECRET_LOOKUPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "mongodocs_secret_lookups_total",
            "Total number of secret store lookups",
        ),
        &["outcome"],
    )
    .expect("Failed to create SECRET_LOOKUPS_TOTAL metric - this should never happen")
});

static STORE_SESSIONS_OPENED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "mongodocs_store_sessions_opened_total",
        "Total number of document store sessions opened",
    )
    .expect("Failed to create STORE_SESSIONS_OPENED_TOTAL metric - this should never happen")
});

/// Register all metrics with the process registry
///
/// # Errors
///
/// Fails if a metric is registered twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(DRIFT_DETECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SECRET_LOOKUPS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_SESSIONS_OPENED_TOTAL.clone()))?;
    Ok(())
}

/// Record one finished lifecycle operation
pub fn record_operation(operation: &str, duration: f64, success: bool) {
    OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
    if !success {
        OPERATION_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }
}

pub fn increment_drift_detected(operation: &str) {
    DRIFT_DETECTED_TOTAL.with_label_values(&[operation]).inc();
}

pub fn record_secret_lookup(outcome: &str) {
    SECRET_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn increment_store_sessions_opened() {
    STORE_SESSIONS_OPENED_TOTAL.inc();
}

/// Render registered metrics in the Prometheus text exposition format
///
/// # Errors
///
/// Fails if encoding fails.
pub fn gather_text() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
