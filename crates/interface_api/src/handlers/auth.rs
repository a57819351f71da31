//! Authentication handlers

use axum::{extract::State, Extension, Json};
use domain_identity::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
use tracing::info;

use crate::auth::Claims;
use crate::dto::{MessageResponse, RevokeTokenBody};
use crate::error::ApiError;
use crate::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.auth.login(request).await?))
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.auth.register(request).await?))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.auth.refresh(request).await?))
}

/// Revokes a refresh token; requires a valid access token
pub async fn revoke_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<RevokeTokenBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.auth.revoke(&body.refresh_token).await? {
        return Err(ApiError::bad_request("Invalid token"));
    }
    info!(user = %claims.sub, "Refresh token revoked");
    Ok(Json(MessageResponse::new("Token revoked")))
}
