//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_batch_requests_total` (counter): inbound batches by route
//! - `gateway_batch_rows` (histogram): rows per batch by route
//! - `gateway_batch_duration_seconds` (histogram): batch latency by route
//! - `gateway_rows_total` (counter): rows by route and outcome
//! - `gateway_downstream_requests_total` (counter): engine calls by engine, status
//! - `gateway_downstream_duration_seconds` (histogram): engine latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_batch(route: &'static str, rows: usize, start: Instant) {
    metrics::counter!("gateway_batch_requests_total", "route" => route).increment(1);
    metrics::histogram!("gateway_batch_rows", "route" => route).record(rows as f64);
    metrics::histogram!("gateway_batch_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_row(route: &'static str, outcome: &'static str) {
    metrics::counter!("gateway_rows_total", "route" => route, "outcome" => outcome).increment(1);
}

pub fn record_downstream(engine: &'static str, status: &str, start: Instant) {
    metrics::counter!(
        "gateway_downstream_requests_total",
        "engine" => engine,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_downstream_duration_seconds", "engine" => engine)
        .record(start.elapsed().as_secs_f64());
}
