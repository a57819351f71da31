//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use core_kernel::{HealthCheckResult, HealthCheckable};

use crate::dto::HealthResponse;
use crate::AppState;

/// Liveness endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Database connectivity
pub async fn database_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthCheckResult>) {
    report(state.database.health_check().await)
}

/// Cache round trip, including expiry of a short-lived probe entry
pub async fn cache_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheckResult>) {
    report(state.cache.health_check().await)
}

fn report(result: HealthCheckResult) -> (StatusCode, Json<HealthCheckResult>) {
    let status = if result.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(result))
}
