/// Persistence Collaborator
///
/// The session subsystem owns no state of its own; refresh token records
/// and credentials live behind this narrow contract. `PostgresRepository`
/// is the production implementation; `InMemoryRepository` backs tests and
/// embedded use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::RepositoryError;

/// A stored refresh token. The token value itself is persisted only as a
/// SHA-256 digest; the plaintext exists solely on the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// A token is active iff it has not been revoked and has not expired.
    /// Expiry boundary: `now == expires_at` counts as expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// A principal's login credential as held by the user-account collaborator.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user_id: Uuid,
    pub password_hash: String,
}

/// A principal as held by the user-account collaborator.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub user_id: Uuid,
    pub email: String,
}

/// Outcome of a conditional revocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevokeOutcome {
    Revoked,
    AlreadyRevoked,
    NotFound,
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<(), RepositoryError>;

    async fn get_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError>;

    /// Set `revoked_at = now` iff it is currently null. Two concurrent
    /// revocations of the same token must resolve so that exactly one
    /// observes `Revoked` and the other `AlreadyRevoked`.
    async fn mark_revoked(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<RevokeOutcome, RepositoryError>;

    async fn get_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, RepositoryError>;

    async fn get_identity(&self, user_id: Uuid) -> Result<Option<IdentityRecord>, RepositoryError>;
}

/// Postgres-backed repository.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for PostgresRepository {
    async fn create_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        let row = sqlx::query_as::<
            _,
            (
                String,
                Uuid,
                DateTime<Utc>,
                DateTime<Utc>,
                Option<DateTime<Utc>>,
            ),
        >(
            r#"
            SELECT token_hash, user_id, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(token_hash, user_id, created_at, expires_at, revoked_at)| RefreshTokenRecord {
                token_hash,
                user_id,
                created_at,
                expires_at,
                revoked_at,
            },
        ))
    }

    async fn mark_revoked(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<RevokeOutcome, RepositoryError> {
        // Conditional update: only one of two racing revokes flips the row.
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1
            WHERE token_hash = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(now)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(RevokeOutcome::Revoked);
        }

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await?;

        if exists > 0 {
            Ok(RevokeOutcome::AlreadyRevoked)
        } else {
            Ok(RevokeOutcome::NotFound)
        }
    }

    async fn get_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, password_hash)| CredentialRecord {
            user_id,
            password_hash,
        }))
    }

    async fn get_identity(&self, user_id: Uuid) -> Result<Option<IdentityRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, (Uuid, String)>("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(user_id, email)| IdentityRecord { user_id, email }))
    }
}

#[derive(Default)]
struct InMemoryState {
    tokens: HashMap<String, RefreshTokenRecord>,
    credentials: HashMap<String, CredentialRecord>,
    identities: HashMap<Uuid, IdentityRecord>,
}

/// In-memory repository for tests and embedded use.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<InMemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user the way the user-account collaborator would.
    pub fn insert_user(&self, user_id: Uuid, email: &str, password_hash: &str) {
        let mut state = self.state.lock().unwrap();
        state.credentials.insert(
            email.to_string(),
            CredentialRecord {
                user_id,
                password_hash: password_hash.to_string(),
            },
        );
        state.identities.insert(
            user_id,
            IdentityRecord {
                user_id,
                email: email.to_string(),
            },
        );
    }

    /// Remove a user, leaving any refresh tokens orphaned.
    pub fn remove_user(&self, user_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(identity) = state.identities.remove(&user_id) {
            state.credentials.remove(&identity.email);
        }
    }
}

#[async_trait]
impl AuthRepository for InMemoryRepository {
    async fn create_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.tokens.insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.tokens.get(token_hash).cloned())
    }

    async fn mark_revoked(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<RevokeOutcome, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        match state.tokens.get_mut(token_hash) {
            None => Ok(RevokeOutcome::NotFound),
            Some(record) if record.revoked_at.is_some() => Ok(RevokeOutcome::AlreadyRevoked),
            Some(record) => {
                record.revoked_at = Some(now);
                Ok(RevokeOutcome::Revoked)
            }
        }
    }

    async fn get_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.credentials.get(email).cloned())
    }

    async fn get_identity(&self, user_id: Uuid) -> Result<Option<IdentityRecord>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.identities.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_record(now: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token_hash: "abc123".to_string(),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[test]
    fn active_iff_not_revoked_and_not_expired() {
        let now = Utc::now();
        let record = sample_record(now);
        assert!(record.is_active(now));
        // Boundary: equality counts as expired.
        assert!(!record.is_active(record.expires_at));
        assert!(!record.is_active(record.expires_at + Duration::seconds(1)));

        let revoked = RefreshTokenRecord {
            revoked_at: Some(now),
            ..record
        };
        assert!(!revoked.is_active(now));
    }

    #[tokio::test]
    async fn mark_revoked_is_conditional() {
        let repo = InMemoryRepository::new();
        let now = Utc::now();
        let record = sample_record(now);
        repo.create_refresh_token(record.clone()).await.unwrap();

        assert_eq!(
            repo.mark_revoked("abc123", now).await.unwrap(),
            RevokeOutcome::Revoked
        );
        assert_eq!(
            repo.mark_revoked("abc123", now).await.unwrap(),
            RevokeOutcome::AlreadyRevoked
        );
        assert_eq!(
            repo.mark_revoked("missing", now).await.unwrap(),
            RevokeOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn credential_and_identity_lookup() {
        let repo = InMemoryRepository::new();
        let user_id = Uuid::new_v4();
        repo.insert_user(user_id, "a@b.com", "$2b$12$fake");

        let credential = repo
            .get_credential_by_email("a@b.com")
            .await
            .unwrap()
            .expect("credential should exist");
        assert_eq!(credential.user_id, user_id);

        let identity = repo
            .get_identity(user_id)
            .await
            .unwrap()
            .expect("identity should exist");
        assert_eq!(identity.email, "a@b.com");

        assert!(repo
            .get_credential_by_email("nobody@b.com")
            .await
            .unwrap()
            .is_none());
    }
}
