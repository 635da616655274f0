//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use album_gateway::config::{CircuitBreakerConfig, UpstreamConfig};
use album_gateway::http::{build_router, AppState};
use album_gateway::lifecycle::Shutdown;
use album_gateway::resilience::BreakerRegistry;
use album_gateway::upstream::UpstreamClient;
use album_gateway::AlbumService;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` is invoked once per connection and returns the status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend that always returns 200 with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (200, body.to_string()) }).await
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Breaker config with a short open wait so tests stay quick.
pub fn fast_breaker(wait_ms: u64) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        wait_duration_in_open_state_ms: wait_ms,
        ..CircuitBreakerConfig::default()
    }
}

/// Build an album service against `addr` with a proxy-free client.
pub fn album_service(
    addr: SocketAddr,
    timeout_secs: u64,
    breaker: CircuitBreakerConfig,
) -> (AlbumService, Arc<BreakerRegistry>) {
    let upstream = UpstreamConfig {
        url: format!("http://{}/albums", addr),
        timeout_secs,
        ..UpstreamConfig::default()
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let client = UpstreamClient::with_client(http, &upstream);

    let registry = Arc::new(BreakerRegistry::new(breaker, Default::default()));
    let service = AlbumService::new(registry.clone(), client, upstream.breaker_name);
    (service, registry)
}

/// Serve the full router for `service` on an ephemeral port.
pub async fn start_gateway(
    service: AlbumService,
    registry: Arc<BreakerRegistry>,
    shutdown: &Shutdown,
) -> SocketAddr {
    let state = AppState {
        albums: Arc::new(service),
        registry,
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut stop = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = axum::serve(listener, build_router(state))
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
