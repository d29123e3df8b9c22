/// Persistence layer
///
/// Repository traits for users, refresh tokens and chirps, with a Postgres
/// implementation for production and an in-memory one for tests and
/// local runs.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use memory::{InMemoryChirpStore, InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PgChirpStore, PgRefreshTokenStore, PgUserStore};

/// Failure reported by a repository
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for crate::error::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => crate::error::AppError::Conflict(msg),
            StoreError::Database(e) => crate::error::AppError::Database(e.to_string()),
        }
    }
}

/// A stored user account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

/// User fields safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// A stored refresh token row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Valid iff not revoked and not yet expired
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// A stored chirp, serialized as-is in responses
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<UserRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Replace email and password hash. `None` if no such user.
    async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Set `is_chirpy_red`. `None` if no such user.
    async fn upgrade_to_chirpy_red(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Set `revoked_at` on a row that is not revoked yet.
    /// Returns `false` when no such row exists.
    async fn revoke(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<ChirpRecord, StoreError>;

    /// All chirps, or only those by `author`, oldest first
    async fn list(&self, author: Option<Uuid>) -> Result<Vec<ChirpRecord>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<ChirpRecord>, StoreError>;

    /// Returns `false` when no such chirp exists
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
