//! Outbound HTTP client for the album endpoint.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::resilience::timeouts::with_timeout;

/// Ways a call to the upstream can fail. The breaker treats them all alike.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),

    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(StatusCode),
}

impl UpstreamError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status(_) => "status",
        }
    }
}

/// GETs one fixed URL and returns the body as text.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("album-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Use an existing `reqwest::Client` (and its connection pool).
    pub fn with_client(http: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the body. Connect, send and body read share one deadline;
    /// any non-2xx status is an error.
    pub async fn fetch_text(&self) -> Result<String, UpstreamError> {
        let request = async {
            let response = self.http.get(&self.url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status(status));
            }
            Ok::<_, UpstreamError>(response.text().await?)
        };

        with_timeout(self.timeout, request)
            .await
            .map_err(|elapsed| UpstreamError::Timeout(elapsed.0))?
    }
}
