//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render `/metrics`. Call once at startup
/// before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    describe();
    info!("prometheus metrics recorder installed");
    handle
}

/// Register help text for every metric the workspace records.
fn describe() {
    metrics::describe_counter!(GENERATION_REQUESTS_TOTAL, "Text operations started");
    metrics::describe_counter!(GENERATION_RETRIES_TOTAL, "Quota retries scheduled");
    metrics::describe_counter!(GENERATION_FALLBACKS_TOTAL, "Text operations answered by the local fallback");
    metrics::describe_gauge!(GENERATION_MODEL_DEGRADED, "1 while a model's recent error rate is above threshold");
    metrics::describe_counter!(TRANSCRIPTIONS_TOTAL, "Transcription jobs by outcome");
    metrics::describe_counter!(HTTP_ERRORS_TOTAL, "Error responses by status");
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric names recorded across the workspace.

/// Text operations started (counter, labels: operation).
pub const GENERATION_REQUESTS_TOTAL: &str = "generation_requests_total";
/// Quota retries scheduled (counter, labels: operation).
pub const GENERATION_RETRIES_TOTAL: &str = "generation_retries_total";
/// Degraded results (counter, labels: operation, reason).
pub const GENERATION_FALLBACKS_TOTAL: &str = "generation_fallbacks_total";
/// Model error rate above threshold (gauge, labels: model). 1 = degraded.
pub const GENERATION_MODEL_DEGRADED: &str = "generation_model_degraded";
/// Transcription jobs by outcome (counter, labels: outcome).
pub const TRANSCRIPTIONS_TOTAL: &str = "transcriptions_total";
/// Error responses (counter, labels: status).
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";
