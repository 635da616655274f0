//! Metrics collection and exposition.
//!
//! # Metrics
//! - `album_gateway_requests_total` (counter): inbound requests by path, status
//! - `album_gateway_request_duration_seconds` (histogram): inbound latency
//! - `album_gateway_breaker_calls_total` (counter): outcomes per breaker
//!   (`success`, `failure`, `not_permitted`)
//! - `album_gateway_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `album_gateway_fallbacks_total` (counter): fallbacks served, by reason
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "album_gateway_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "album_gateway_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_breaker_call(breaker: &str, outcome: &'static str) {
    counter!(
        "album_gateway_breaker_calls_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_breaker_state(breaker: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::Open => 1.0,
        CircuitState::HalfOpen => 2.0,
    };
    gauge!("album_gateway_breaker_state", "breaker" => breaker.to_string()).set(value);
}

pub fn record_fallback(breaker: &str, reason: &'static str) {
    counter!(
        "album_gateway_fallbacks_total",
        "breaker" => breaker.to_string(),
        "reason" => reason
    )
    .increment(1);
}
