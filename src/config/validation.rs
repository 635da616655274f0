//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! constraints. All errors are collected, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{CircuitBreakerConfig, GatewayConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if reqwest::Url::parse(&config.upstream.url).is_err() {
        errors.push(ValidationError::new(
            "upstream.url",
            format!("'{}' is not a valid URL", config.upstream.url),
        ));
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be greater than 0"));
    }
    if config.upstream.breaker_name.trim().is_empty() {
        errors.push(ValidationError::new("upstream.breaker_name", "must not be empty"));
    }

    validate_breaker("circuit_breaker", &config.circuit_breaker, &mut errors);
    for (name, breaker) in &config.circuit_breaker_instances {
        validate_breaker(&format!("circuit_breaker_instances.{name}"), breaker, &mut errors);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_breaker(prefix: &str, cb: &CircuitBreakerConfig, errors: &mut Vec<ValidationError>) {
    if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 100.0) {
        errors.push(ValidationError::new(
            format!("{prefix}.failure_rate_threshold"),
            "must be in (0, 100]",
        ));
    }
    if cb.sliding_window_size == 0 {
        errors.push(ValidationError::new(
            format!("{prefix}.sliding_window_size"),
            "must be at least 1",
        ));
    }
    if cb.minimum_number_of_calls == 0 || cb.minimum_number_of_calls > cb.sliding_window_size {
        errors.push(ValidationError::new(
            format!("{prefix}.minimum_number_of_calls"),
            "must be between 1 and sliding_window_size",
        ));
    }
    if cb.wait_duration_in_open_state_ms == 0 {
        errors.push(ValidationError::new(
            format!("{prefix}.wait_duration_in_open_state_ms"),
            "must be greater than 0",
        ));
    }
    if cb.permitted_calls_in_half_open == 0 {
        errors.push(ValidationError::new(
            format!("{prefix}.permitted_calls_in_half_open"),
            "must be at least 1",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.upstream.url = "::nope::".into();
        config.circuit_breaker.failure_rate_threshold = 0.0;
        config.circuit_breaker.sliding_window_size = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"upstream.url"));
        assert!(fields.contains(&"circuit_breaker.failure_rate_threshold"));
        assert!(fields.contains(&"circuit_breaker.sliding_window_size"));
        // minimum_number_of_calls (2) now exceeds the window (0)
        assert!(fields.contains(&"circuit_breaker.minimum_number_of_calls"));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_instance_overrides_are_validated() {
        let mut config = GatewayConfig::default();
        let mut albums = CircuitBreakerConfig::default();
        albums.permitted_calls_in_half_open = 0;
        config.circuit_breaker_instances.insert("albums".into(), albums);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::new(
                "circuit_breaker_instances.albums.permitted_calls_in_half_open",
                "must be at least 1",
            )]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
