use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Role;

/// Default lifetime of an issued token, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Account identifier, string form.
    pub sub: String,
    pub role: Role,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// The verified identity a token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies signed, time-bounded identity assertions.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &str, role: Role) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}

/// HS256 JWT implementation of `TokenService` keyed by a single secret.
///
/// The secret is injected at construction and never changes afterwards, so
/// independently keyed instances can coexist (one per test, for example).
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    leeway_secs: i64,
}

impl JwtService {
    /// # Arguments
    /// * `secret` - HMAC key shared by issuance and verification.
    /// * `ttl_secs` - Lifetime added to the issue time to form `exp`.
    /// * `leeway_secs` - Clock-skew tolerance applied when checking `exp`.
    pub fn new(secret: &[u8], ttl_secs: i64, leeway_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
            leeway_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a token as if the current time were `now` (seconds since epoch).
    pub fn issue_at(&self, subject: &str, role: Role, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// The token is valid strictly before `exp + leeway`; at or after that
    /// instant it is `Expired`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, TokenError> {
        let claims = self.decode_claims(token)?;
        if now >= claims.exp + self.leeway_secs {
            return Err(TokenError::Expired);
        }
        Ok(Identity {
            subject: claims.sub,
            role: claims.role,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` with an inclusive bound.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

impl TokenService for JwtService {
    fn issue(&self, subject: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject, role, Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }
}
