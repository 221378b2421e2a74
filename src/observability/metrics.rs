//! Metrics collection and exposition.
//!
//! # Metrics
//! - `frontdoor_decisions_total` (counter): gate outcomes by outcome, reason
//! - `frontdoor_requests_total` (counter): completed requests by method, status
//! - `frontdoor_request_duration_seconds` (histogram): latency distribution
//! - `frontdoor_upstream_errors_total` (counter): failed upstream forwards
//!
//! # Design Decisions
//! - Reasons are fixed labels; request content never becomes a label
//! - Recording is a no-op until an exporter is installed

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::frontdoor::Rejection;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_accepted() {
    counter!("frontdoor_decisions_total", "outcome" => "accept", "reason" => "trusted").increment(1);
}

pub fn record_rejected(rejection: &Rejection) {
    counter!("frontdoor_decisions_total", "outcome" => "reject", "reason" => rejection.label()).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "frontdoor_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("frontdoor_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error() {
    counter!("frontdoor_upstream_errors_total").increment(1);
}
