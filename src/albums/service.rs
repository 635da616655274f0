//! Album listing guarded by a circuit breaker.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::observability::metrics;
use crate::resilience::{BreakerError, BreakerRegistry};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Body served when the upstream is skipped or fails.
pub const DEFAULT_ALBUM_LIST: &str = r#"[ { "userId": 1, "id": 1, "title": "default album" } ]"#;

/// Fetches the album list through the named breaker.
#[derive(Debug, Clone)]
pub struct AlbumService {
    registry: Arc<BreakerRegistry>,
    client: UpstreamClient,
    breaker_name: String,
}

impl AlbumService {
    pub fn new(
        registry: Arc<BreakerRegistry>,
        client: UpstreamClient,
        breaker_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            client,
            breaker_name: breaker_name.into(),
        }
    }

    /// Build the client and service from configuration.
    pub fn from_config(
        config: &GatewayConfig,
        registry: Arc<BreakerRegistry>,
    ) -> Result<Self, reqwest::Error> {
        let client = UpstreamClient::new(&config.upstream)?;
        Ok(Self::new(registry, client, config.upstream.breaker_name.clone()))
    }

    pub fn breaker_name(&self) -> &str {
        &self.breaker_name
    }

    /// The upstream body, or [`DEFAULT_ALBUM_LIST`]. Never fails.
    pub async fn get_album_list(&self) -> String {
        let breaker = self.registry.get_or_create(&self.breaker_name);

        breaker
            .run_with_fallback(|| self.client.fetch_text(), |err| self.fallback(err))
            .await
    }

    fn fallback(&self, err: BreakerError<UpstreamError>) -> String {
        let reason = match &err {
            BreakerError::NotPermitted(_) => "not_permitted",
            BreakerError::Failed(e) => e.kind(),
        };
        tracing::warn!(
            breaker = %self.breaker_name,
            url = %self.client.url(),
            reason,
            error = %err,
            "Serving default album list"
        );
        metrics::record_fallback(&self.breaker_name, reason);
        DEFAULT_ALBUM_LIST.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_literal_is_single_default_record() {
        let parsed: serde_json::Value = serde_json::from_str(DEFAULT_ALBUM_LIST).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([{ "userId": 1, "id": 1, "title": "default album" }])
        );
        assert_eq!(
            DEFAULT_ALBUM_LIST,
            "[ { \"userId\": 1, \"id\": 1, \"title\": \"default album\" } ]"
        );
    }
}
