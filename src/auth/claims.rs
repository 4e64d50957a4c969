/// JWT Claims structure
///
/// Payload of an access token: the registered claims this service signs
/// (RFC 7519), nothing more. Access tokens are stateless; there is no
/// revocation list, only the `exp` claim.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims for a subject with an expiry `ttl_seconds` from now.
    pub fn new(user_id: Uuid, ttl_seconds: i64, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
            iss: issuer.to_string(),
        }
    }

    /// Extract the subject identity from the claims.
    ///
    /// # Errors
    /// Returns `TokenError::MalformedSubject` if `sub` is not a valid UUID.
    pub fn subject(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::MalformedSubject)
    }

    /// Whether the token is expired at `now` (exact equality is expired).
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}
