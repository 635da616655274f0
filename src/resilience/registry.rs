//! Process-wide circuit breaker registry.
//!
//! Breakers are created on first lookup and live until the registry is
//! dropped. A name with an entry in `circuit_breaker_instances` gets that
//! config; every other name gets the default.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::{CircuitBreakerConfig, GatewayConfig};
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};

#[derive(Debug, Default)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    default_config: CircuitBreakerConfig,
    instances: HashMap<String, CircuitBreakerConfig>,
}

impl BreakerRegistry {
    pub fn new(
        default_config: CircuitBreakerConfig,
        instances: HashMap<String, CircuitBreakerConfig>,
    ) -> Self {
        Self {
            breakers: DashMap::new(),
            default_config,
            instances,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.circuit_breaker.clone(),
            config.circuit_breaker_instances.clone(),
        )
    }

    /// Look up the breaker for `name`, creating it if needed.
    ///
    /// Concurrent callers racing on a new name all receive the same instance.
    pub fn get_or_create(&self, name: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(name) {
            return existing.value().clone();
        }

        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                let config = self.config_for(name);
                tracing::info!(
                    breaker = %name,
                    failure_rate_threshold = config.failure_rate_threshold,
                    sliding_window_size = config.sliding_window_size,
                    wait_ms = config.wait_duration_in_open_state_ms,
                    "Circuit breaker created"
                );
                Arc::new(CircuitBreaker::new(name, config))
            })
            .value()
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| entry.value().clone())
    }

    /// Snapshots of every breaker created so far, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<_> = self
            .breakers
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    fn config_for(&self, name: &str) -> CircuitBreakerConfig {
        self.instances
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default_config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitState;
    use std::thread;

    #[test]
    fn test_same_name_same_breaker() {
        let registry = BreakerRegistry::default();
        let a = registry.get_or_create("albums");
        let b = registry.get_or_create("albums");
        let other = registry.get_or_create("photos");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_state_is_shared_through_registry() {
        let registry = BreakerRegistry::default();
        for _ in 0..2 {
            registry
                .get_or_create("albums")
                .try_acquire()
                .unwrap()
                .record_failure();
        }
        assert_eq!(registry.get("albums").unwrap().state(), CircuitState::Open);
        assert!(registry.get("photos").is_none());
    }

    #[test]
    fn test_instance_override_applies() {
        let override_config = CircuitBreakerConfig {
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            ..CircuitBreakerConfig::default()
        };
        let registry = BreakerRegistry::new(
            CircuitBreakerConfig::default(),
            HashMap::from([("albums".to_string(), override_config.clone())]),
        );

        assert_eq!(registry.get_or_create("albums").config(), &override_config);
        assert_eq!(
            registry.get_or_create("photos").config(),
            &CircuitBreakerConfig::default()
        );
    }

    #[test]
    fn test_concurrent_creation_yields_one_instance() {
        let registry = Arc::new(BreakerRegistry::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.get_or_create("albums"))
            })
            .collect();

        let breakers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(breakers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshots_sorted_by_name() {
        let registry = BreakerRegistry::default();
        registry.get_or_create("zeta");
        registry.get_or_create("alpha");

        let names: Vec<_> = registry.snapshots().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
