//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reddit_proxy_requests_total` (counter): handled requests by mode, status
//! - `reddit_proxy_cache_events_total` (counter): hit / miss / error / write
//! - `reddit_proxy_token_refresh_total` (counter): refresh outcomes
//! - `reddit_proxy_upstream_duration_seconds` (histogram): upstream latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter runs its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(mode: &'static str, status: u16) {
    counter!(
        "reddit_proxy_requests_total",
        "mode" => mode,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_cache_event(event: &'static str) {
    counter!("reddit_proxy_cache_events_total", "event" => event).increment(1);
}

pub fn record_token_refresh(outcome: &'static str) {
    counter!("reddit_proxy_token_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_upstream_latency(start: Instant) {
    histogram!("reddit_proxy_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
