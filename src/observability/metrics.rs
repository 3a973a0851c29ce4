//! Metrics collection and exposition.
//!
//! # Metrics
//! - `podcastdb_config_loads_total` (counter): first loads by source, outcome
//! - `podcastdb_config_reloads_total` (counter): watch-triggered reloads by source, outcome
//! - `podcastdb_requests_total` (counter): requests by method, route, status
//! - `podcastdb_request_duration_seconds` (histogram): latency by method, route
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_config_load(source: &str, outcome: &'static str) {
    metrics::counter!(
        "podcastdb_config_loads_total",
        "source" => source.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_config_reload(source: &str, outcome: &'static str) {
    metrics::counter!(
        "podcastdb_config_reloads_total",
        "source" => source.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "podcastdb_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "podcastdb_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
