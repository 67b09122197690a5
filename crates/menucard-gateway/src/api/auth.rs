//! Login and token refresh endpoints.

use std::sync::Arc;

use axum::{Form, Json, extract::State};
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::server::GatewayState;

use super::ApiError;

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Café login name.
    pub login: String,
    /// Café password.
    pub password: String,
}

/// `POST /cafe/auth/login`
///
/// Verifies credentials and answers with a fresh token pair. Unknown login
/// and wrong password are indistinguishable in the response.
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Form(req): Form<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    if req.login.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Login and password are required".to_string(),
        ));
    }

    let pair = state.auth.login(req.login.trim(), &req.password)?;
    tracing::info!(login = %req.login.trim(), "Cafe logged in");
    Ok(Json(pair))
}

/// Refresh form body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token obtained at login or a previous refresh.
    pub refresh_token: String,
}

/// `POST /cafe/refresh-token`
///
/// Exchanges an unexpired refresh token for a new pair. Any validation
/// failure of the old token is surfaced verbatim; nothing is issued then.
pub async fn refresh(
    State(state): State<Arc<GatewayState>>,
    Form(req): Form<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    if req.refresh_token.is_empty() {
        return Err(ApiError::BadRequest("Refresh token is required".to_string()));
    }

    let pair = state.auth.refresh(&req.refresh_token)?;
    Ok(Json(pair))
}
