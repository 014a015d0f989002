//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_rejections_total` (counter): requests refused before dispatch, by reason
//! - `gateway_dispatch_total` (counter): dispatch outcomes
//! - `gateway_dispatch_in_flight` (gauge): requests waiting for a processor reply

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(reason: &'static str) {
    ::metrics::counter!("gateway_rejections_total", "reason" => reason).increment(1);
}

pub fn record_dispatch(outcome: &'static str) {
    ::metrics::counter!("gateway_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_in_flight(count: u64) {
    ::metrics::gauge!("gateway_dispatch_in_flight").set(count as f64);
}
