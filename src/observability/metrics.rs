//! Metrics collection and exposition.
//!
//! # Metrics
//! - `inference_attempts_total` (counter): dispatch attempts by backend, outcome
//! - `inference_attempt_duration_seconds` (histogram): per-attempt latency
//! - `inference_probes_total` (counter): liveness probes by backend, outcome
//! - `inference_backend_healthy` (gauge): 1=healthy, 0=unhealthy
//!
//! Recording is a no-op until a recorder is installed, so library users pay
//! nothing unless they call [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::Instant;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one dispatch attempt.
pub fn record_attempt(backend: &str, outcome: &'static str, started: Instant) {
    metrics::counter!(
        "inference_attempts_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("inference_attempt_duration_seconds", "backend" => backend.to_string())
        .record(started.elapsed().as_secs_f64());
}

/// Record a liveness probe result.
pub fn record_probe(backend: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "inference_probes_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Publish a backend's health state.
pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("inference_backend_healthy", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
