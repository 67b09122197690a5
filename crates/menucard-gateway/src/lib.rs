//! # Menucard Gateway
//!
//! HTTP server for the Menucard menu-management backend: JWT
//! authentication, café/category/food endpoints, and image uploads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// REST API handlers.
pub mod api;
/// Authentication and authorization.
pub mod auth;
mod server;
/// Uploaded image handling.
pub mod uploads;

pub use api::ApiError;
pub use auth::{AuthConfig, AuthError, AuthState, Claims, JwtManager, RequireCafe, TokenPair};
pub use server::{Gateway, GatewayConfig, GatewayState};
pub use uploads::UploadError;

/// Start the gateway server.
///
/// # Errors
///
/// Returns error if server fails to start.
pub async fn start(config: GatewayConfig) -> Result<(), GatewayError> {
    let gateway = Gateway::new(config)?;
    gateway.run().await
}

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Server error.
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
