//! Credentials: password hashing, bearer token signing and the seam for
//! third-party identity tokens.
//!
//! These are injected into the [`Engine`](crate::Engine) at build time; the
//! engine never reaches for global state.

use std::fmt;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Hashes a password with argon2 and a fresh random salt.
pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Internal(format!("failed to hash password: {err}")))
}

/// Checks a password against a stored PHC hash string.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::error!("stored password hash cannot be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Claims carried by a bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Token id, used for revocation.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens (HS256).
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issues a token whose subject is `user_id`.
    pub fn issue(&self, user_id: i32) -> ResultEngine<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| EngineError::Internal(format!("failed to sign token: {err}")))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> ResultEngine<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!("rejected bearer token: {err}");
                EngineError::Unauthorized("invalid or expired token".to_string())
            })
    }
}

/// An authenticated bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: i32,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity asserted by a third-party token (Google ID token).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

/// Verifies third-party identity tokens.
///
/// Implementations must fail closed: any transport error, timeout or
/// unexpected response is an [`EngineError::Unauthorized`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> ResultEngine<VerifiedIdentity>;
}

/// Verifier used when no identity provider is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledIdentityVerifier;

#[async_trait]
impl IdentityVerifier for DisabledIdentityVerifier {
    async fn verify(&self, _id_token: &str) -> ResultEngine<VerifiedIdentity> {
        Err(EngineError::Unauthorized(
            "identity provider login is not configured".to_string(),
        ))
    }
}
