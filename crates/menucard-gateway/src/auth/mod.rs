//! Authentication and authorization for the gateway.
//!
//! This module provides:
//! - Credential verification against stored password hashes
//! - JWT access/refresh token issuance, validation, and renewal
//! - The request-boundary access guard for café-only routes

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtManager, TokenPair};
pub use middleware::{AuthState, CafePrincipal, RequireCafe};
pub use password::{generate_password, hash_password, verify_password};

pub use menucard_core::config::AuthConfig;

use thiserror::Error;

/// Resolve the signing secret, warning when the weak dev fallback is in
/// effect.
pub(crate) fn config_secret(config: &AuthConfig) -> String {
    let (secret, fallback) = config.resolve_secret();
    if fallback {
        tracing::warn!(
            "No JWT secret configured; using the built-in development secret. \
             Set MENUCARD_JWT_SECRET for any real deployment."
        );
    }
    secret
}

/// Authentication errors.
///
/// Everything here is recovered at the request boundary and turned into a
/// status code; none of these crash the serving process. There are no
/// retries: an auth failure is terminal for that request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identity not found or password mismatch. Reported uniformly so the
    /// response never reveals which of the two it was.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No `Authorization: Bearer <token>` header on a protected request.
    #[error("Authorization header required")]
    MissingAuthHeader,

    /// Token is structurally invalid (not a three-part compact JWT).
    #[error("Malformed token")]
    TokenMalformed,

    /// Signature verification failed, or the token was signed with an
    /// algorithm outside the expected HMAC family.
    #[error("Invalid token signature")]
    TokenSignatureInvalid,

    /// Token expiry is at or before the current instant.
    #[error("Token expired")]
    TokenExpired,

    /// A required claim is absent or has the wrong type.
    #[error("Missing or invalid claim: {0}")]
    TokenClaimMissing(String),

    /// Valid token, but its role lacks access to the guarded route.
    #[error("Forbidden: cafe access required")]
    RoleForbidden,

    /// Token construction failed; a server fault, fatal for the request
    /// only.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Storage error while looking up credentials.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error (unusable key material, broken stored hash).
    #[error("Config error: {0}")]
    Config(String),
}

impl From<menucard_core::StoreError> for AuthError {
    fn from(e: menucard_core::StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}
