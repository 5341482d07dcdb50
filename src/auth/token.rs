//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and role. They are valid until
//! `exp`; there is no refresh and no revocation list.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::entities::{Role, UserModel};
use crate::errors::{Error, Result};

/// Payload stored in the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per the JWT convention
    pub sub: String,
    /// Role at issue time; the middleware trusts the database copy instead
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    /// The numeric user id carried in `sub`.
    pub fn user_id(&self) -> Result<i64> {
        self.sub.parse().map_err(|_| Error::Unauthorized {
            message: "Invalid token subject".to_string(),
        })
    }
}

/// Issues and checks bearer tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_seconds: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Builds a service signing with `secret`.
    #[must_use]
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Signs a token for `user`.
    pub fn issue(&self, user: &UserModel) -> Result<String> {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        self.sign(&Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now,
            exp: now.saturating_add(self.expiry_seconds),
        })
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding).map_err(|e| Error::Crypto {
            message: format!("Failed to generate token: {e}"),
        })
    }

    /// Checks signature and expiry and returns the claims.
    ///
    /// # Errors
    /// [`Error::Unauthorized`] for anything that is not a live token signed with our secret.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| {
                let message = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    _ => "Invalid token",
                };
                Error::Unauthorized {
                    message: message.to_string(),
                }
            })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
