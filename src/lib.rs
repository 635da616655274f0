//! Album gateway library.
//!
//! Serves `GET /albums` by calling a remote album endpoint through a circuit
//! breaker, answering with a static default list whenever the call is
//! skipped or fails.

pub mod admin;
pub mod albums;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use albums::{AlbumService, DEFAULT_ALBUM_LIST};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{BreakerRegistry, CircuitBreaker, CircuitState};
