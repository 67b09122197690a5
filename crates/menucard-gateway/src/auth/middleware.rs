//! Access guard for café-only routes.
//!
//! The guard itself is a pure function from request headers to an
//! admission decision — no storage lookup, no I/O — so it can be unit
//! tested without a running server. The axum extractor is a thin wrapper
//! over it.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use menucard_core::CafeStore;
use menucard_core::types::{CafeId, Role};
use serde::Serialize;

use super::AuthError;
use super::config_secret;
use super::jwt::{JwtManager, TokenPair};
use super::password::verify_password;
use menucard_core::config::AuthConfig;

/// Shared authentication state.
pub struct AuthState {
    /// Auth configuration.
    pub config: AuthConfig,
    /// JWT manager.
    pub jwt: JwtManager,
    /// Café accounts, used for the login credential lookup only.
    pub cafes: CafeStore,
}

impl AuthState {
    /// Create a new auth state.
    #[must_use]
    pub const fn new(config: AuthConfig, jwt: JwtManager, cafes: CafeStore) -> Self {
        Self { config, jwt, cafes }
    }

    /// Initialize auth state from configuration.
    ///
    /// Resolves the signing secret (env/config, with the acknowledged weak
    /// dev fallback) and builds the JWT manager with it.
    #[must_use]
    pub fn initialize(config: AuthConfig, cafes: CafeStore) -> Self {
        let secret = config_secret(&config);
        let jwt = JwtManager::new(
            secret.as_bytes(),
            config.access_expiry(),
            config.refresh_expiry(),
        );
        Self::new(config, jwt, cafes)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// Unknown login and wrong password produce the same error, so the
    /// response never confirms which identities exist.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any mismatch, or an
    /// internal error variant.
    pub fn login(&self, login: &str, password: &str) -> Result<TokenPair, AuthError> {
        let cafe = self
            .cafes
            .get_by_login(login)?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &cafe.password_hash)?;

        self.jwt.issue_pair(&cafe.role, cafe.id.value())
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// Returns a token validation error or [`AuthError::Signing`].
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.jwt.refresh(refresh_token)
    }

    /// Admit or reject a request from its headers alone.
    ///
    /// Terminal on first failure:
    /// 1. extract the bearer token (else [`AuthError::MissingAuthHeader`],
    ///    before any parsing is attempted)
    /// 2. validate signature, shape, and expiry
    /// 3. require the café role (else [`AuthError::RoleForbidden`])
    /// 4. bind the validated identity for downstream handlers
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; the request is rejected,
    /// the connection and process are unaffected.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<CafePrincipal, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;

        let token =
            JwtManager::extract_from_header(header).ok_or(AuthError::MissingAuthHeader)?;

        let claims = self.jwt.validate(token)?;

        if !claims.role.is_cafe() {
            return Err(AuthError::RoleForbidden);
        }

        Ok(CafePrincipal {
            id: CafeId::new(claims.id),
            role: claims.role,
        })
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The authenticated café bound into the request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CafePrincipal {
    /// Café identity from the validated token.
    pub id: CafeId,
    /// Role from the validated token (always the café role on admission).
    pub role: Role,
}

/// Extractor for café-protected routes.
///
/// Use this in handler parameters to require an authenticated café.
#[derive(Debug, Clone)]
pub struct RequireCafe(pub CafePrincipal);

impl RequireCafe {
    /// Get the café ID.
    #[must_use]
    pub const fn cafe_id(&self) -> CafeId {
        self.0.id
    }
}

impl<S> FromRequestParts<S> for RequireCafe
where
    S: Send + Sync,
    crate::server::AuthStateRef: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = crate::server::AuthStateRef::from_ref(state).0;
        auth_state
            .authorize(&parts.headers)
            .map(RequireCafe)
            .map_err(IntoResponse::into_response)
    }
}

/// Error response for auth failures.
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            Self::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "missing_auth_header"),
            Self::TokenMalformed => (StatusCode::UNAUTHORIZED, "token_malformed"),
            Self::TokenSignatureInvalid => {
                (StatusCode::UNAUTHORIZED, "token_signature_invalid")
            }
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
            Self::TokenClaimMissing(_) => (StatusCode::UNAUTHORIZED, "token_claim_missing"),
            Self::RoleForbidden => (StatusCode::FORBIDDEN, "forbidden"),
            Self::Signing(_) | Self::Storage(_) | Self::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = AuthErrorResponse {
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use menucard_core::Store;
    use menucard_core::store::CafeDraft;
    use tempfile::TempDir;

    fn auth_state() -> (TempDir, AuthState) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let config = AuthConfig {
            jwt_secret: Some("unit-test-secret".to_string()),
            ..AuthConfig::default()
        };
        let state = AuthState::initialize(config, store.cafes().clone());
        (dir, state)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn admits_valid_cafe_token() {
        let (_dir, state) = auth_state();
        let pair = state.jwt.issue_pair(&Role::Cafe, 42).unwrap();

        let principal = state.authorize(&bearer(&pair.access_token)).unwrap();
        assert_eq!(principal.id, CafeId::new(42));
        assert_eq!(principal.role, Role::Cafe);
    }

    #[test]
    fn missing_header_short_circuits() {
        let (_dir, state) = auth_state();

        let result = state.authorize(&HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[test]
    fn non_bearer_header_is_missing() {
        let (_dir, state) = auth_state();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));

        assert!(matches!(
            state.authorize(&headers),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn wrong_role_is_forbidden_not_unauthorized() {
        let (_dir, state) = auth_state();
        let pair = state
            .jwt
            .issue_pair(&Role::Other("customer".to_string()), 7)
            .unwrap();

        let result = state.authorize(&bearer(&pair.access_token));
        assert!(matches!(result, Err(AuthError::RoleForbidden)));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let (_dir, state) = auth_state();

        assert!(matches!(
            state.authorize(&bearer("garbage")),
            Err(AuthError::TokenMalformed)
        ));
    }

    #[test]
    fn login_is_uniform_on_mismatch() {
        let (_dir, state) = auth_state();

        // Unknown login.
        let unknown = state.login("nobody", "pw").unwrap_err();

        // Known login, wrong password.
        let hash = super::super::hash_password("right-password").unwrap();
        state
            .cafes
            .create(CafeDraft {
                login: "corner".to_string(),
                password_hash: hash,
                name: "Corner".to_string(),
                code: "C-1".to_string(),
                phone_numbers: vec![],
                expiry_date: None,
            })
            .unwrap();
        let wrong = state.login("corner", "wrong-password").unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[test]
    fn login_issues_working_pair() {
        let (_dir, state) = auth_state();

        let hash = super::super::hash_password("açar-söz").unwrap();
        let cafe = state
            .cafes
            .create(CafeDraft {
                login: "corner".to_string(),
                password_hash: hash,
                name: "Corner".to_string(),
                code: "C-1".to_string(),
                phone_numbers: vec![],
                expiry_date: None,
            })
            .unwrap();

        let pair = state.login("corner", "açar-söz").unwrap();
        let principal = state.authorize(&bearer(&pair.access_token)).unwrap();
        assert_eq!(principal.id, cafe.id);

        let renewed = state.refresh(&pair.refresh_token).unwrap();
        let renewed_claims = state.jwt.validate(&renewed.access_token).unwrap();
        assert_eq!(renewed_claims.id, cafe.id.value());
        assert_eq!(renewed_claims.role, Role::Cafe);
    }
}
