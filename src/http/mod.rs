//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign x-request-id)
//!     → list_albums → AlbumService
//!     → 200 with live or default body
//! ```

pub mod request;
pub mod server;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer, ServerError, ALBUMS_PATH};
