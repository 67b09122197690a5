//! API error type and response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use menucard_core::{StoreError, ValidationError};

use crate::auth::AuthError;
use crate::uploads::UploadError;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication or authorization failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),

    /// Target record does not exist (or belongs to another café).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upload failure.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Auth failures keep their own status/code mapping.
        let error = match self {
            Self::Auth(e) => return e.into_response(),
            other => other,
        };

        let status = match &error {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upload(UploadError::Io(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upload(_) => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::error!(error = %error, "API handler failed");
        }

        let body = json!({ "success": false, "error": error.to_string() });
        (status, Json(body)).into_response()
    }
}
