/// Refresh Token Management
///
/// Refresh tokens are:
/// - 256 bits from the OS random source, hex encoded (64 characters)
/// - Persisted server-side, one row per login
/// - Revocable; a revoked or expired row is dead but kept
/// - Never rotated on use
///
/// Unknown, revoked and expired tokens all fail the same way so callers
/// cannot tell them apart.

use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::AuthError;
use crate::store::RefreshTokenRepository;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token
///
/// # Errors
/// `Entropy` if the OS random source is unavailable
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Entropy(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// Persist a refresh token for `user_id`, expiring `ttl` from now
///
/// A token whose save failed must not be handed to the client.
///
/// # Errors
/// `Persistence` on any store failure, including a duplicate token
pub async fn save_refresh_token(
    store: &dyn RefreshTokenRepository,
    user_id: Uuid,
    token: &str,
    ttl: Duration,
) -> Result<(), AuthError> {
    let expires_at = Utc::now() + ttl;

    store
        .insert(token, user_id, expires_at)
        .await
        .map_err(|e| AuthError::Persistence(e.to_string()))
}

/// Resolve a refresh token to the user that owns it
///
/// # Errors
/// - `TokenRevokedOrUnknown` if the token is unknown, revoked or expired
/// - `Persistence` on store failure
pub async fn validate_refresh_token(
    store: &dyn RefreshTokenRepository,
    token: &str,
) -> Result<Uuid, AuthError> {
    let record = store
        .find(token)
        .await
        .map_err(|e| AuthError::Persistence(e.to_string()))?;

    match record {
        None => {
            tracing::warn!("Refresh token not found");
            Err(AuthError::TokenRevokedOrUnknown)
        }
        Some(record) if record.revoked_at.is_some() => {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            Err(AuthError::TokenRevokedOrUnknown)
        }
        Some(record) if !record.is_active(Utc::now()) => {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            Err(AuthError::TokenRevokedOrUnknown)
        }
        Some(record) => Ok(record.user_id),
    }
}

/// Revoke a refresh token
///
/// # Errors
/// - `TokenRevokedOrUnknown` if no row matches or it is already revoked
/// - `Persistence` on store failure
pub async fn revoke_refresh_token(
    store: &dyn RefreshTokenRepository,
    token: &str,
) -> Result<(), AuthError> {
    let revoked = store
        .revoke(token, Utc::now())
        .await
        .map_err(|e| AuthError::Persistence(e.to_string()))?;

    if revoked {
        Ok(())
    } else {
        Err(AuthError::TokenRevokedOrUnknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRefreshTokenStore;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().unwrap();

        assert_eq!(token.len(), 64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_tokens_are_unique() {
        let first = generate_refresh_token().unwrap();
        let second = generate_refresh_token().unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_save_then_validate_returns_owner() {
        let store = InMemoryRefreshTokenStore::new();
        let user_id = Uuid::new_v4();
        let token = generate_refresh_token().unwrap();

        save_refresh_token(&store, user_id, &token, Duration::days(60))
            .await
            .unwrap();

        assert_eq!(validate_refresh_token(&store, &token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let store = InMemoryRefreshTokenStore::new();

        let result = validate_refresh_token(&store, "deadbeef").await;
        assert!(matches!(result, Err(AuthError::TokenRevokedOrUnknown)));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let store = InMemoryRefreshTokenStore::new();
        let token = generate_refresh_token().unwrap();

        save_refresh_token(&store, Uuid::new_v4(), &token, Duration::seconds(-1))
            .await
            .unwrap();

        let result = validate_refresh_token(&store, &token).await;
        assert!(matches!(result, Err(AuthError::TokenRevokedOrUnknown)));
    }

    #[tokio::test]
    async fn test_revoke_then_validate_and_revoke_again() {
        let store = InMemoryRefreshTokenStore::new();
        let token = generate_refresh_token().unwrap();

        save_refresh_token(&store, Uuid::new_v4(), &token, Duration::days(60))
            .await
            .unwrap();

        revoke_refresh_token(&store, &token).await.unwrap();

        assert!(matches!(
            validate_refresh_token(&store, &token).await,
            Err(AuthError::TokenRevokedOrUnknown)
        ));
        assert!(matches!(
            revoke_refresh_token(&store, &token).await,
            Err(AuthError::TokenRevokedOrUnknown)
        ));
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let store = InMemoryRefreshTokenStore::new();

        assert!(matches!(
            revoke_refresh_token(&store, "deadbeef").await,
            Err(AuthError::TokenRevokedOrUnknown)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_token_is_a_persistence_failure() {
        let store = InMemoryRefreshTokenStore::new();
        let token = generate_refresh_token().unwrap();

        save_refresh_token(&store, Uuid::new_v4(), &token, Duration::days(60))
            .await
            .unwrap();

        let result = save_refresh_token(&store, Uuid::new_v4(), &token, Duration::days(60)).await;
        assert!(matches!(result, Err(AuthError::Persistence(_))));
    }
}
