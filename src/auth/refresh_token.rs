/// Refresh Token Store
///
/// Issues, resolves, and revokes long-lived opaque session tokens against
/// the persistence collaborator. Token values are:
/// - 64-character cryptographically random alphanumeric strings
///   (~381 bits of entropy; collisions are treated as negligible)
/// - hashed with SHA-256 before storage (plaintext never leaves the client)
/// - revoked by setting `revoked_at`, never deleted, so the audit trail
///   survives logout

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::repository::{AuthRepository, RefreshTokenRecord, RevokeOutcome};

const TOKEN_LENGTH: usize = 64;

/// Generate a new cryptographically secure refresh token value.
fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Digest a token value for storage and lookup.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Store for long-lived opaque refresh tokens.
///
/// Holds no state of its own; every record lives in the repository, so the
/// store is freely shareable across request handlers.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn AuthRepository>,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    /// Issue a new refresh token for `owner`, valid for `ttl`.
    ///
    /// Returns the plaintext token value; only its digest is persisted.
    pub async fn issue(&self, owner: Uuid, ttl: Duration) -> Result<String, StoreError> {
        let token = generate_token();
        let now = Utc::now();

        self.repository
            .create_refresh_token(RefreshTokenRecord {
                token_hash: hash_token(&token),
                user_id: owner,
                created_at: now,
                expires_at: now + ttl,
                revoked_at: None,
            })
            .await?;

        Ok(token)
    }

    /// Look up the record for a token value.
    ///
    /// Deliberately does NOT reject expired or revoked tokens; callers
    /// evaluate `RefreshTokenRecord::is_active` themselves so "never
    /// existed" and "no longer usable" stay distinguishable for auditing.
    pub async fn resolve(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.repository
            .get_refresh_token(&hash_token(token))
            .await?
            .ok_or(StoreError::TokenNotFound)
    }

    /// Revoke a token. Not idempotent: a second revocation of the same
    /// token is reported as `AlreadyRevoked`, since it may indicate replay.
    pub async fn revoke(&self, token: &str) -> Result<(), StoreError> {
        match self
            .repository
            .mark_revoked(&hash_token(token), Utc::now())
            .await?
        {
            RevokeOutcome::Revoked => Ok(()),
            RevokeOutcome::AlreadyRevoked => Err(StoreError::AlreadyRevoked),
            RevokeOutcome::NotFound => Err(StoreError::TokenNotFound),
        }
    }

    /// Resolve an *active* token to its owning identity.
    pub async fn owner_of(&self, token: &str) -> Result<Uuid, StoreError> {
        let record = self.resolve(token).await?;
        if !record.is_active(Utc::now()) {
            return Err(StoreError::TokenInactive);
        }
        Ok(record.user_id)
    }
}
