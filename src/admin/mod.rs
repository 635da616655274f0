//! Read-only operational endpoints.
//!
//! - `GET /health`
//! - `GET /admin/breakers`
//! - `GET /admin/breakers/{name}`

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::{get_breaker, get_breakers, get_health};
use crate::http::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(get_health))
        .route("/admin/breakers", get(get_breakers))
        .route("/admin/breakers/{name}", get(get_breaker))
}
