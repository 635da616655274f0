//! Configuration schema definitions.
//!
//! Every section carries defaults equal to the service's built-in constants,
//! so an empty file (or no file at all) yields the stock behaviour.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Breaker name used by the album service unless configured otherwise.
pub const DEFAULT_BREAKER_NAME: &str = "albums";

/// Album listing endpoint proxied by the service.
pub const DEFAULT_UPSTREAM_URL: &str = "https://jsonplaceholder.typicode.com/albums";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound album endpoint.
    pub upstream: UpstreamConfig,

    /// Default settings for every circuit breaker.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Per-name overrides, keyed by breaker name.
    pub circuit_breaker_instances: HashMap<String, CircuitBreakerConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URL fetched by `GET /albums`.
    pub url: String,

    /// Deadline for the whole call (connect, send, body) in seconds.
    pub timeout_secs: u64,

    /// Name of the breaker guarding the call.
    pub breaker_name: String,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_secs: 4,
            breaker_name: DEFAULT_BREAKER_NAME.to_string(),
        }
    }
}

/// Circuit breaker tuning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failure percentage (0-100] at or above which the breaker opens.
    pub failure_rate_threshold: f32,

    /// Number of most recent calls kept in the count-based window.
    pub sliding_window_size: usize,

    /// Calls that must be buffered before the failure rate is evaluated.
    pub minimum_number_of_calls: usize,

    /// Time spent open before a trial call is let through, in milliseconds.
    pub wait_duration_in_open_state_ms: u64,

    /// Trial calls admitted while half-open.
    pub permitted_calls_in_half_open: usize,
}

impl CircuitBreakerConfig {
    pub fn wait_duration_in_open_state(&self) -> Duration {
        Duration::from_millis(self.wait_duration_in_open_state_ms)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 2,
            minimum_number_of_calls: 2,
            wait_duration_in_open_state_ms: 1000,
            permitted_calls_in_half_open: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
