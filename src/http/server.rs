//! HTTP server setup and the album request handler.
//!
//! # Responsibilities
//! - Create the Axum router (`GET /albums` plus admin routes)
//! - Wire up middleware (request ID, tracing)
//! - Serve on a listener until the shutdown signal fires

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin;
use crate::albums::AlbumService;
use crate::config::GatewayConfig;
use crate::http::request::{request_id_of, RequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resilience::BreakerRegistry;

pub const ALBUMS_PATH: &str = "/albums";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub albums: Arc<AlbumService>,
    pub registry: Arc<BreakerRegistry>,
}

/// Startup failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// HTTP server for the album gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    registry: Arc<BreakerRegistry>,
}

impl HttpServer {
    /// Create the server, its breaker registry and upstream client.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let registry = Arc::new(BreakerRegistry::from_config(&config));
        let albums = AlbumService::from_config(&config, registry.clone())?;

        let state = AppState {
            albums: Arc::new(albums),
            registry: registry.clone(),
        };

        Ok(Self {
            router: build_router(state),
            config,
            registry,
        })
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            breaker = %self.config.upstream.breaker_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<BreakerRegistry> {
        &self.registry
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id_of(request),
        )
    });

    Router::new()
        .route(ALBUMS_PATH, get(list_albums))
        .merge(admin::routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
                .layer(trace)
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
}

/// `GET /albums`: always 200, live body or the default list.
async fn list_albums(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let body = state.albums.get_album_list().await;
    metrics::record_request("GET", ALBUMS_PATH, StatusCode::OK.as_u16(), start);
    (StatusCode::OK, body)
}
