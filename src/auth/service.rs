/// Session Service
///
/// Orchestrates password verification, access token issuance, and refresh
/// token lifecycle into the login / refresh / revoke / authenticate
/// operations. A session moves Anonymous -> Authenticated -> Revoked (on
/// logout), with the access token lapsing on its own short TTL.
///
/// Internal failure kinds are logged here and then collapsed to the coarse
/// `SessionError` categories; a caller never learns whether a rejected
/// token was unknown, revoked, or cryptographically bad.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::bearer::extract_bearer_token;
use crate::auth::jwt::{issue_access_token, validate_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::RefreshTokenStore;
use crate::configuration::AuthSettings;
use crate::error::{SessionError, StoreError};
use crate::repository::AuthRepository;

/// Tokens handed to a client on successful login.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    repository: Arc<dyn AuthRepository>,
    tokens: RefreshTokenStore,
    settings: AuthSettings,
    /// Sacrificial digest verified against on credential lookup misses, so
    /// an unknown email costs the same bcrypt work as a wrong password.
    enumeration_guard: String,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn AuthRepository>,
        settings: AuthSettings,
    ) -> Result<Self, SessionError> {
        let enumeration_guard = hash_password("enumeration-guard")
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        Ok(Self {
            tokens: RefreshTokenStore::new(repository.clone()),
            repository,
            settings,
            enumeration_guard,
        })
    }

    /// Authenticate a user by email and password.
    ///
    /// On success issues one access token and one refresh token. Unknown
    /// email and wrong password produce the identical error value, and
    /// both paths run one bcrypt verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError> {
        let credential = self.repository.get_credential_by_email(email).await?;

        let credential = match credential {
            Some(credential) => credential,
            None => {
                let _ = verify_password(password, &self.enumeration_guard);
                tracing::warn!("Login attempt for unknown email");
                return Err(SessionError::InvalidCredentials);
            }
        };

        match verify_password(password, &credential.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(user_id = %credential.user_id, "Login attempt with wrong password");
                return Err(SessionError::InvalidCredentials);
            }
            Err(e) => {
                // An unreadable digest must present like a mismatch, or an
                // attacker could tell which accounts exist.
                tracing::error!(user_id = %credential.user_id, error = %e, "Stored digest is unreadable");
                return Err(SessionError::InvalidCredentials);
            }
        }

        let access_token = issue_access_token(&credential.user_id, &self.settings)
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        let refresh_token = self
            .tokens
            .issue(
                credential.user_id,
                Duration::seconds(self.settings.refresh_token_expiry),
            )
            .await
            .map_err(store_to_internal)?;

        tracing::info!(user_id = %credential.user_id, "User logged in");

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token for the session behind a refresh token.
    ///
    /// The refresh token itself is left unchanged; it is reused until
    /// revoked or expired. Revoked and unknown tokens are rejected
    /// identically; only plain expiry is surfaced as `SessionExpired` so
    /// the client knows to prompt a re-login.
    pub async fn refresh(&self, bearer_header: Option<&str>) -> Result<String, SessionError> {
        let token = extract_bearer_token(bearer_header)?;

        let record = match self.tokens.resolve(token).await {
            Ok(record) => record,
            Err(StoreError::TokenNotFound) => {
                tracing::warn!("Refresh attempt with unknown token");
                return Err(SessionError::Unauthorized);
            }
            Err(e) => return Err(store_to_internal(e)),
        };

        if record.revoked_at.is_some() {
            tracing::warn!(user_id = %record.user_id, "Refresh attempt with revoked token");
            return Err(SessionError::Unauthorized);
        }
        if Utc::now() >= record.expires_at {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(SessionError::SessionExpired);
        }

        let identity = self
            .repository
            .get_identity(record.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %record.user_id, "Refresh token owner no longer exists");
                SessionError::Unauthorized
            })?;

        issue_access_token(&identity.user_id, &self.settings)
            .map_err(|e| SessionError::Internal(e.to_string()))
    }

    /// Revoke the session behind a refresh token (logout).
    ///
    /// Revoking twice is a conflict, not a no-op; a repeat revocation may
    /// indicate token replay.
    pub async fn revoke_session(&self, bearer_header: Option<&str>) -> Result<(), SessionError> {
        let token = extract_bearer_token(bearer_header)?;

        match self.tokens.revoke(token).await {
            Ok(()) => {
                tracing::info!("Session revoked");
                Ok(())
            }
            Err(StoreError::AlreadyRevoked) => {
                tracing::warn!("Revoke attempt on already-revoked token");
                Err(SessionError::Conflict)
            }
            Err(StoreError::TokenNotFound) | Err(StoreError::TokenInactive) => {
                tracing::warn!("Revoke attempt with unusable token");
                Err(SessionError::Unauthorized)
            }
            Err(e) => Err(store_to_internal(e)),
        }
    }

    /// Resolve the identity asserted by an access token.
    ///
    /// Every validation failure collapses to `Unauthorized`; expired vs
    /// malformed vs bad signature is logged but never exposed.
    pub fn authenticate(&self, bearer_header: Option<&str>) -> Result<Uuid, SessionError> {
        let token = extract_bearer_token(bearer_header)?;

        validate_access_token(token, &self.settings).map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            SessionError::Unauthorized
        })
    }
}

fn store_to_internal(err: StoreError) -> SessionError {
    SessionError::Internal(err.to_string())
}
