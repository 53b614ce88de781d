//! Prometheus metrics for monitoring bracket operations.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! (configured via `METRICS_BIND`) for scraping by monitoring systems.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter.
///
/// Sets up a scrape endpoint at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record a bracket generation; `forced` marks audited regenerations
pub fn brackets_generated_total(forced: bool) {
    metrics::counter!("brackets_generated_total",
        "forced" => forced.to_string()
    )
    .increment(1);
}

/// Record a committed score; `correction` marks amended results
pub fn scores_recorded_total(correction: bool) {
    metrics::counter!("scores_recorded_total",
        "correction" => correction.to_string()
    )
    .increment(1);
}

/// Record a match moved to in-progress
pub fn matches_started_total() {
    metrics::counter!("matches_started_total").increment(1);
}

/// Record HTTP request with method, path, and status labels
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
