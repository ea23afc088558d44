//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "chat_relay_requests_total",
        "Chat requests by outcome before streaming started"
    );
    metrics::describe_counter!(
        "chat_relay_streams_total",
        "Finished relays by outcome"
    );
    metrics::describe_counter!(
        "chat_relay_tokens_relayed_total",
        "Token events delivered to clients"
    );
    metrics::describe_counter!(
        "chat_relay_grounding_fallbacks_total",
        "Requests retried without the search grounding tool"
    );
    metrics::describe_histogram!(
        "chat_relay_request_duration_seconds",
        "Time until the stream started or the request failed"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a request that either started streaming or failed before it
pub fn record_request(status: &str, model: &str, duration_secs: f64) {
    metrics::counter!(
        "chat_relay_requests_total",
        "status" => status.to_string(),
        "model" => model.to_string()
    )
    .increment(1);
    metrics::histogram!("chat_relay_request_duration_seconds", "model" => model.to_string())
        .record(duration_secs);
}

/// Record a finished relay
pub fn record_stream(outcome: &str, tokens: u64, model: &str) {
    metrics::counter!(
        "chat_relay_streams_total",
        "outcome" => outcome.to_string(),
        "model" => model.to_string()
    )
    .increment(1);
    metrics::counter!("chat_relay_tokens_relayed_total", "model" => model.to_string())
        .increment(tokens);
}

pub fn record_grounding_fallback(model: &str) {
    metrics::counter!("chat_relay_grounding_fallbacks_total", "model" => model.to_string())
        .increment(1);
}
