use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    ChirpRecord, ChirpRepository, RefreshTokenRecord, RefreshTokenRepository, StoreError,
    UserRecord, UserRepository,
};

/// Users held in process memory, keyed by id
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());

        if users.values().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation(format!("email {}", email)));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
            is_chirpy_red: false,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());

        if users.values().any(|u| u.email == email && u.id != user_id) {
            return Err(StoreError::UniqueViolation(format!("email {}", email)));
        }

        Ok(users.get_mut(&user_id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, user_id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());

        Ok(users.get_mut(&user_id).map(|user| {
            user.is_chirpy_red = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

/// Refresh token rows held in process memory, keyed by token
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    rows: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenStore {
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());

        if rows.contains_key(token) {
            return Err(StoreError::UniqueViolation("refresh token".to_string()));
        }

        let now = Utc::now();
        rows.insert(
            token.to_string(),
            RefreshTokenRecord {
                token: token.to_string(),
                user_id,
                created_at: now,
                updated_at: now,
                expires_at,
                revoked_at: None,
            },
        );

        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rows.get(token).cloned())
    }

    async fn revoke(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());

        match rows.get_mut(token) {
            Some(row) if row.revoked_at.is_none() => {
                row.revoked_at = Some(revoked_at);
                row.updated_at = revoked_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Chirps held in process memory, in insertion order
#[derive(Default)]
pub struct InMemoryChirpStore {
    chirps: Mutex<Vec<ChirpRecord>>,
}

impl InMemoryChirpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChirpRepository for InMemoryChirpStore {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<ChirpRecord, StoreError> {
        let now = Utc::now();
        let chirp = ChirpRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };

        let mut chirps = self.chirps.lock().unwrap_or_else(|e| e.into_inner());
        chirps.push(chirp.clone());

        Ok(chirp)
    }

    async fn list(&self, author: Option<Uuid>) -> Result<Vec<ChirpRecord>, StoreError> {
        let chirps = self.chirps.lock().unwrap_or_else(|e| e.into_inner());

        Ok(chirps
            .iter()
            .filter(|c| author.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<ChirpRecord>, StoreError> {
        let chirps = self.chirps.lock().unwrap_or_else(|e| e.into_inner());
        Ok(chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut chirps = self.chirps.lock().unwrap_or_else(|e| e.into_inner());
        let before = chirps.len();
        chirps.retain(|c| c.id != id);

        Ok(chirps.len() < before)
    }
}
