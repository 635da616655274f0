use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::resilience::BreakerSnapshot;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

pub async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_breakers(State(state): State<AppState>) -> Json<Vec<BreakerSnapshot>> {
    Json(state.registry.snapshots())
}

pub async fn get_breaker(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BreakerSnapshot>, (StatusCode, String)> {
    state
        .registry
        .get(&name)
        .map(|breaker| Json(breaker.snapshot()))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no circuit breaker named '{name}'")))
}
