//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by routing category and status
//! - `edge_request_duration_seconds` (histogram): latency by routing category
//! - `edge_rate_limited_total` (counter): requests rejected with 429
//! - `edge_counter_store_errors_total` (counter): failed-open store calls by store
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(category: &'static str, status: u16, start: Instant) {
    counter!("edge_requests_total", "category" => category, "status" => status.to_string())
        .increment(1);
    histogram!("edge_request_duration_seconds", "category" => category)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(scope: &str) {
    counter!("edge_rate_limited_total", "scope" => scope.to_string()).increment(1);
}

pub fn record_store_error(store: &'static str) {
    counter!("edge_counter_store_errors_total", "store" => store).increment(1);
}
