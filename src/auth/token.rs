//! Signed token codec.
//!
//! Tokens are HS512-signed JWTs carrying [`UserInfo`] claims. Validation
//! accepts only HS512, requires `exp` and allows no clock leeway.

use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Claims of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject (user identifier).
    pub sub: String,

    /// Expiry, Unix seconds.
    #[serde(rename = "exp")]
    pub expiry: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Provider that authenticated the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl UserInfo {
    pub fn new(sub: impl Into<String>, expiry: u64) -> Self {
        Self {
            sub: sub.into(),
            expiry,
            name: None,
            email: None,
            picture: None,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expiry < now
    }
}

/// Token errors. Validation failures are deliberately opaque: the cause is
/// only reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs and validates tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user: &UserInfo) -> Result<String, TokenError> {
        encode(&Header::new(SIGNING_ALGORITHM), user, &self.encoding).map_err(TokenError::Signing)
    }

    /// Check signature, algorithm and expiry, and return the claims.
    pub fn validate(&self, token: &str) -> Result<UserInfo, TokenError> {
        decode::<UserInfo>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

/// Current time, Unix seconds.
pub fn now() -> u64 {
    jsonwebtoken::get_current_timestamp()
}
