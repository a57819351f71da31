//! API error handling
//!
//! Domain errors become an [`ApiResponse`] envelope with `success: false`
//! and a status code chosen by what the caller can do about the failure.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_identity::AuthError;
use domain_property::PropertyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Response envelope shared by every domain route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<()> {
    /// A success without a payload
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: Vec::new(),
        }
    }
}

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    BadRequest { message: String, errors: Vec<String> },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::BadRequest {
            errors: vec![message.clone()],
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match &self {
            ApiError::BadRequest { errors, .. } => errors.clone(),
            other => vec![other.to_string()],
        };
        let body = ApiResponse::<()> {
            success: false,
            message: self.to_string(),
            data: None,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PropertyError> for ApiError {
    fn from(err: PropertyError) -> Self {
        match err {
            PropertyError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PropertyError::AlreadyExists(message) => ApiError::Conflict(message),
            PropertyError::InvalidOperation(message) => ApiError::bad_request(message),
            PropertyError::Validation(errors) => ApiError::BadRequest {
                message: "Validation failed".to_string(),
                errors,
            },
            PropertyError::OperationFailed { message, source } => {
                error!(error = ?source, "{}", message);
                ApiError::Internal(message)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => ApiError::BadRequest {
                message: errors.first().cloned().unwrap_or_else(|| "Validation failed".to_string()),
                errors,
            },
            AuthError::Unauthorized(message) => ApiError::Unauthorized(message),
            AuthError::OperationFailed { message, source } => {
                error!(error = ?source, "{}", message);
                ApiError::Internal(message)
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}
