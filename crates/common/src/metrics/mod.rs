//! Metrics and observability utilities
//!
//! Metric names are constants so that call sites and the descriptions
//! registered at startup cannot drift apart.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all Glossify metrics
pub const METRICS_PREFIX: &str = "glossify";

pub const UPLOADS_TOTAL: &str = "glossify_uploads_total";
pub const UPLOADS_REJECTED_TOTAL: &str = "glossify_uploads_rejected_total";
pub const INGESTION_DURATION_SECONDS: &str = "glossify_ingestion_duration_seconds";
pub const ANALYSIS_DURATION_SECONDS: &str = "glossify_analysis_duration_seconds";
pub const PERSISTENCE_DEGRADED_TOTAL: &str = "glossify_persistence_degraded_total";
pub const EXPLANATIONS_TOTAL: &str = "glossify_explanations_total";
pub const EXPLAINER_FALLBACKS_TOTAL: &str = "glossify_explainer_fallbacks_total";
pub const FILE_REMOVALS_FAILED_TOTAL: &str = "glossify_file_removals_failed_total";

/// Buckets for language-model latency (seconds)
pub const MODEL_BUCKETS: &[f64] = &[
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.000, // 2s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
    60.00, // 1m
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(UPLOADS_TOTAL, Unit::Count, "Uploads that completed ingestion");

    describe_counter!(
        UPLOADS_REJECTED_TOTAL,
        Unit::Count,
        "Uploads rejected, labelled by reason"
    );

    describe_histogram!(
        INGESTION_DURATION_SECONDS,
        Unit::Seconds,
        "End-to-end ingestion latency in seconds"
    );

    describe_histogram!(
        ANALYSIS_DURATION_SECONDS,
        Unit::Seconds,
        "Document analysis model call latency in seconds"
    );

    describe_counter!(
        PERSISTENCE_DEGRADED_TOTAL,
        Unit::Count,
        "Ingestions whose file or record write failed, labelled by target"
    );

    describe_counter!(
        EXPLANATIONS_TOTAL,
        Unit::Count,
        "Term explanations served, labelled by source"
    );

    describe_counter!(
        EXPLAINER_FALLBACKS_TOTAL,
        Unit::Count,
        "Explanations that fell back to the placeholder"
    );

    describe_counter!(
        FILE_REMOVALS_FAILED_TOTAL,
        Unit::Count,
        "Stored files that could not be removed"
    );

    tracing::info!("Metrics registered");
}

/// Record a rejected upload
pub fn record_rejection(reason: &'static str) {
    counter!(UPLOADS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

/// Record a completed ingestion
pub fn record_ingestion(duration_secs: f64) {
    counter!(UPLOADS_TOTAL).increment(1);
    histogram!(INGESTION_DURATION_SECONDS).record(duration_secs);
}

/// Record a persistence failure that did not fail the upload
pub fn record_degraded(target: &'static str) {
    counter!(PERSISTENCE_DEGRADED_TOTAL, "target" => target).increment(1);
}

/// Record a served explanation
pub fn record_explanation(source: &'static str, fallback: bool) {
    counter!(EXPLANATIONS_TOTAL, "source" => source).increment(1);
    if fallback {
        counter!(EXPLAINER_FALLBACKS_TOTAL).increment(1);
    }
}
