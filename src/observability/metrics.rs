//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fakeminder_requests_total` (counter): requests by method, status, route
//! - `fakeminder_request_duration_seconds` (histogram): latency distribution
//! - `fakeminder_decisions_total` (counter): dispatcher decisions by route kind
//! - `fakeminder_logins_total` (counter): login submits by outcome
//! - `fakeminder_active_sessions` (gauge): sessions in the store
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels are low-cardinality (route kinds, outcomes), never user names

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!("fakeminder_requests_total", &labels).increment(1);
    histogram!("fakeminder_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_decision(route: &'static str) {
    counter!("fakeminder_decisions_total", "route" => route).increment(1);
}

pub fn record_login(outcome: &'static str) {
    counter!("fakeminder_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("fakeminder_active_sessions").set(count as f64);
}
