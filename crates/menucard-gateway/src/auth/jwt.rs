//! JWT token management.
//!
//! Tokens are compact HS256 JWTs carrying a typed claims set. Issuance,
//! validation, and refresh are pure CPU work against an immutable shared
//! secret; nothing here touches storage.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
    errors::ErrorKind,
};
use menucard_core::types::Role;
use serde::{Deserialize, Serialize};

use super::AuthError;

/// JWT claims.
///
/// Decoded as a typed struct at the validation boundary; a claim that is
/// absent or has the wrong type fails the decode with a typed error rather
/// than surfacing as a missing map key downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Café identity the token was issued for.
    pub id: u64,
    /// Role label.
    pub role: Role,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// A pair of access and refresh tokens.
///
/// Both tokens of a pair carry identical `id` and `role`; they differ only
/// in expiry and intended use. There is no server-side session table — a
/// token dies by expiry or signature failure alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived, authorizes individual requests).
    pub access_token: String,
    /// Refresh token (long-lived, only exchanges for new pairs).
    pub refresh_token: String,
    /// Access token expiration.
    pub expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// JWT manager for creating and validating tokens.
///
/// The signing secret is injected at construction and immutable afterwards.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry: Duration,
    refresh_expiry: Duration,
}

impl JwtManager {
    /// Create a new JWT manager with a secret key.
    #[must_use]
    pub fn new(secret: &[u8], access_expiry: Duration, refresh_expiry: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_expiry,
            refresh_expiry,
        }
    }

    /// Issue an access/refresh pair for a principal.
    ///
    /// Both tokens are minted from the same instant, so `id`, `role`, and
    /// `iat` match exactly; only `exp` differs.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if token encoding fails.
    pub fn issue_pair(&self, role: &Role, id: u64) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        let access_exp = now + expiry_secs(self.access_expiry);
        let refresh_exp = now + expiry_secs(self.refresh_expiry);

        let access_token = self.sign(&Claims {
            id,
            role: role.clone(),
            iat: now,
            exp: access_exp,
        })?;
        let refresh_token = self.sign(&Claims {
            id,
            role: role.clone(),
            iat: now,
            exp: refresh_exp,
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: timestamp_to_datetime(access_exp),
            refresh_expires_at: timestamp_to_datetime(refresh_exp),
        })
    }

    /// Validate and decode a token.
    ///
    /// Only the HS256 algorithm is accepted; a token signed any other way
    /// fails as a signature error even when otherwise well-formed. The
    /// check is deterministic given the token and the current instant.
    ///
    /// # Errors
    ///
    /// Returns the matching [`AuthError`] token variant.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(map_decode_error)?;

        // `exp` equal to the current second is already unusable.
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Exchange a valid refresh token for a brand-new pair.
    ///
    /// Validation failures surface verbatim; no tokens are issued on
    /// failure. The old refresh token is not invalidated — it stays usable
    /// until its own expiry, since the server keeps no revocation state.
    ///
    /// # Errors
    ///
    /// Returns a token validation error or [`AuthError::Signing`].
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate(refresh_token)?;
        self.issue_pair(&claims.role, claims.id)
    }

    /// Extract the token from an `Authorization` header value.
    ///
    /// Expects format: "Bearer <token>"
    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .finish_non_exhaustive()
    }
}

/// Map a `jsonwebtoken` decode failure onto the auth error taxonomy.
///
/// Claims-shape failures (`Json`) only occur after the signature verified,
/// so they mean a well-signed token with a wrong-typed or missing claim.
fn map_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::ImmatureSignature => AuthError::TokenSignatureInvalid,
        ErrorKind::MissingRequiredClaim(claim) => AuthError::TokenClaimMissing(claim.clone()),
        ErrorKind::Json(e) => AuthError::TokenClaimMissing(e.to_string()),
        _ => AuthError::TokenMalformed,
    }
}

fn expiry_secs(expiry: Duration) -> i64 {
    i64::try_from(expiry.as_secs()).unwrap_or(i64::MAX)
}

fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-key-1234567890";

    fn manager() -> JwtManager {
        JwtManager::new(
            TEST_SECRET,
            Duration::from_secs(15 * 60),
            Duration::from_secs(12 * 3600),
        )
    }

    fn sign_raw<T: Serialize>(algorithm: Algorithm, claims: &T) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap()
    }

    #[test]
    fn issued_access_token_round_trips() {
        let pair = manager().issue_pair(&Role::Cafe, 42).unwrap();
        let claims = manager().validate(&pair.access_token).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.role, Role::Cafe);

        // ~15 minutes ahead, with a few seconds of slack for the test run.
        let expected = Utc::now().timestamp() + 15 * 60;
        assert!((claims.exp - expected).abs() <= 5);
    }

    #[test]
    fn pair_differs_only_in_expiry() {
        let pair = manager().issue_pair(&Role::Cafe, 42).unwrap();

        let access = manager().validate(&pair.access_token).unwrap();
        let refresh = manager().validate(&pair.refresh_token).unwrap();

        assert_eq!(access.id, refresh.id);
        assert_eq!(access.role, refresh.role);
        assert_eq!(access.iat, refresh.iat);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn expiry_boundary() {
        let now = Utc::now().timestamp();

        let expired = sign_raw(
            Algorithm::HS256,
            &Claims {
                id: 42,
                role: Role::Cafe,
                iat: now - 60,
                exp: now - 1,
            },
        );
        assert!(matches!(
            manager().validate(&expired),
            Err(AuthError::TokenExpired)
        ));

        let alive = sign_raw(
            Algorithm::HS256,
            &Claims {
                id: 42,
                role: Role::Cafe,
                iat: now,
                exp: now + 2,
            },
        );
        assert!(manager().validate(&alive).is_ok());
    }

    #[test]
    fn rejects_other_algorithms() {
        let now = Utc::now().timestamp();
        let token = sign_raw(
            Algorithm::HS384,
            &Claims {
                id: 42,
                role: Role::Cafe,
                iat: now,
                exp: now + 600,
            },
        );

        assert!(matches!(
            manager().validate(&token),
            Err(AuthError::TokenSignatureInvalid)
        ));
    }

    #[test]
    fn rejects_wrong_secret() {
        let pair = manager().issue_pair(&Role::Cafe, 42).unwrap();
        let other = JwtManager::new(
            b"another-secret",
            Duration::from_secs(900),
            Duration::from_secs(43200),
        );

        assert!(matches!(
            other.validate(&pair.access_token),
            Err(AuthError::TokenSignatureInvalid)
        ));
    }

    #[test]
    fn rejects_missing_expiry() {
        #[derive(Serialize)]
        struct NoExpiry {
            id: u64,
            role: &'static str,
            iat: i64,
        }

        let token = sign_raw(
            Algorithm::HS256,
            &NoExpiry {
                id: 42,
                role: "cafe",
                iat: Utc::now().timestamp(),
            },
        );

        assert!(matches!(
            manager().validate(&token),
            Err(AuthError::TokenClaimMissing(_))
        ));
    }

    #[test]
    fn rejects_wrong_typed_claim() {
        #[derive(Serialize)]
        struct StringId {
            id: &'static str,
            role: &'static str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let token = sign_raw(
            Algorithm::HS256,
            &StringId {
                id: "forty-two",
                role: "cafe",
                iat: now,
                exp: now + 600,
            },
        );

        assert!(matches!(
            manager().validate(&token),
            Err(AuthError::TokenClaimMissing(_))
        ));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            manager().validate("not-a-token"),
            Err(AuthError::TokenMalformed)
        ));
        assert!(matches!(
            manager().validate("a.b"),
            Err(AuthError::TokenMalformed)
        ));
    }

    #[test]
    fn refresh_produces_fresh_pair() {
        let m = manager();
        let pair = m.issue_pair(&Role::Cafe, 42).unwrap();
        let old_access = m.validate(&pair.access_token).unwrap();

        // Cross a second boundary so the new expiry is strictly later.
        std::thread::sleep(Duration::from_millis(1100));

        let new_pair = m.refresh(&pair.refresh_token).unwrap();
        let new_access = m.validate(&new_pair.access_token).unwrap();

        assert_eq!(new_access.id, old_access.id);
        assert_eq!(new_access.role, old_access.role);
        assert!(new_access.exp > old_access.exp);

        // Statelessness: the old refresh token is still usable.
        assert!(m.refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn refresh_rejects_expired_token() {
        let now = Utc::now().timestamp();
        let stale = sign_raw(
            Algorithm::HS256,
            &Claims {
                id: 42,
                role: Role::Cafe,
                iat: now - 7200,
                exp: now - 3600,
            },
        );

        assert!(matches!(
            manager().refresh(&stale),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn extract_from_header() {
        assert_eq!(
            JwtManager::extract_from_header("Bearer abc123"),
            Some("abc123")
        );
        assert_eq!(
            JwtManager::extract_from_header("bearer abc123"),
            Some("abc123")
        );
        assert_eq!(JwtManager::extract_from_header("abc123"), None);
        assert_eq!(JwtManager::extract_from_header("Basic abc123"), None);
    }
}
