//! Metrics collection and exposition.
//!
//! # Metrics
//! - `authz_decisions_total` (counter): checks by outcome
//! - `authz_decision_duration_seconds` (histogram): check latency by outcome
//! - `authz_reloads_total` (counter): namespace reloads by result
//! - `authz_namespaces` (gauge): namespaces in the installed snapshot
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str, start: Instant) {
    metrics::counter!("authz_decisions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("authz_decision_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("authz_reloads_total", "result" => result).increment(1);
}

pub fn set_namespace_count(count: usize) {
    metrics::gauge!("authz_namespaces").set(count as f64);
}
