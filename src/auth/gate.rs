/// Authentication façade
///
/// Owns the auth settings and the store handles, and runs the login,
/// refresh and revoke protocols on top of the password, access-token and
/// refresh-token primitives.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use uuid::Uuid;

use crate::auth::header::{extract_api_key, extract_bearer_token};
use crate::auth::jwt::{issue_access_token, validate_access_token};
use crate::auth::password::{verify_dummy_password, verify_password};
use crate::auth::refresh_token::{
    generate_refresh_token, revoke_refresh_token, save_refresh_token, validate_refresh_token,
};
use crate::configuration::AuthSettings;
use crate::error::AuthError;
use crate::store::{RefreshTokenRepository, UserRecord, UserRepository};

/// Result of a successful login
#[derive(Debug)]
pub struct LoginSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserRecord,
}

pub struct AuthGate {
    settings: AuthSettings,
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl AuthGate {
    pub fn new(
        settings: AuthSettings,
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        Self {
            settings,
            users,
            refresh_tokens,
        }
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    /// Authenticate a request from its `Bearer` access token
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer_token(headers)?;
        validate_access_token(&token, &self.settings.secret)
    }

    /// Check a password login and open a new session
    ///
    /// Unknown email and wrong password are both `CredentialInvalid`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Persistence(e.to_string()))?;

        let user = match user {
            Some(user) => user,
            None => {
                verify_dummy_password(password);
                return Err(AuthError::CredentialInvalid);
            }
        };

        verify_password(password, &user.hashed_password)?;

        let access_token =
            issue_access_token(user.id, &self.settings.secret, self.settings.access_token_ttl())?;

        let refresh_token = generate_refresh_token()?;
        save_refresh_token(
            self.refresh_tokens.as_ref(),
            user.id,
            &refresh_token,
            self.settings.refresh_token_ttl(),
        )
        .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Mint a new access token from a `Bearer` refresh token.
    /// The refresh token itself is left untouched.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let refresh_token = extract_bearer_token(headers)?;
        let user_id = validate_refresh_token(self.refresh_tokens.as_ref(), &refresh_token).await?;

        let access_token =
            issue_access_token(user_id, &self.settings.secret, self.settings.access_token_ttl())?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the `Bearer` refresh token
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let refresh_token = extract_bearer_token(headers)?;
        revoke_refresh_token(self.refresh_tokens.as_ref(), &refresh_token).await?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Check the `ApiKey` credential of a webhook call
    pub fn verify_api_key(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let key = extract_api_key(headers)?;
        if key == self.settings.api_key {
            Ok(())
        } else {
            Err(AuthError::TokenInvalid)
        }
    }
}

/// Require `identity` to own the resource owned by `owner_id`
pub fn authorize_owner(identity: Uuid, owner_id: Uuid) -> Result<(), AuthError> {
    if identity == owner_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::store::{InMemoryRefreshTokenStore, InMemoryUserStore};
    use actix_web::http::header::{HeaderValue, AUTHORIZATION};

    fn settings() -> AuthSettings {
        AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 60 * 24 * 3600,
            api_key: "polka-key".to_string(),
        }
    }

    fn gate() -> AuthGate {
        AuthGate::new(
            settings(),
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryRefreshTokenStore::new()),
        )
    }

    fn authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn bearer(token: &str) -> HeaderMap {
        authorization(&format!("Bearer {}", token))
    }

    async fn register(gate: &AuthGate, email: &str, password: &str) -> UserRecord {
        let hash = hash_password(password).unwrap();
        gate.users().create(email, &hash).await.unwrap()
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_generic_failure() {
        let gate = gate();

        let result = gate.login("a@b.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::CredentialInvalid)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_generic_failure() {
        let gate = gate();
        register(&gate, "a@b.com", "secret1").await;

        let result = gate.login("a@b.com", "secret2").await;
        assert!(matches!(result, Err(AuthError::CredentialInvalid)));
    }

    #[tokio::test]
    async fn test_login_empty_password_rejected() {
        let gate = gate();
        register(&gate, "empty@b.com", "").await;

        let result = gate.login("empty@b.com", "").await;
        assert!(matches!(result, Err(AuthError::CredentialInvalid)));
    }

    #[tokio::test]
    async fn test_login_issues_usable_tokens() {
        let gate = gate();
        let user = register(&gate, "a@b.com", "secret1").await;

        let session = gate.login("a@b.com", "secret1").await.unwrap();

        assert_eq!(session.user.id, user.id);
        assert_eq!(session.refresh_token.len(), 64);
        assert_eq!(gate.authenticate(&bearer(&session.access_token)).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_refresh_mints_access_token_without_rotation() {
        let gate = gate();
        let user = register(&gate, "a@b.com", "secret1").await;
        let session = gate.login("a@b.com", "secret1").await.unwrap();

        let first = gate.refresh(&bearer(&session.refresh_token)).await.unwrap();
        let second = gate.refresh(&bearer(&session.refresh_token)).await.unwrap();

        assert_eq!(gate.authenticate(&bearer(&first)).unwrap(), user.id);
        assert_eq!(gate.authenticate(&bearer(&second)).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_access_token_cannot_be_used_to_refresh() {
        let gate = gate();
        register(&gate, "a@b.com", "secret1").await;
        let session = gate.login("a@b.com", "secret1").await.unwrap();

        let result = gate.refresh(&bearer(&session.access_token)).await;
        assert!(matches!(result, Err(AuthError::TokenRevokedOrUnknown)));
    }

    #[tokio::test]
    async fn test_two_logins_are_independently_revocable() {
        let gate = gate();
        register(&gate, "a@b.com", "secret1").await;

        let first = gate.login("a@b.com", "secret1").await.unwrap();
        let second = gate.login("a@b.com", "secret1").await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        gate.revoke(&bearer(&first.refresh_token)).await.unwrap();

        assert!(gate.refresh(&bearer(&first.refresh_token)).await.is_err());
        assert!(gate.refresh(&bearer(&second.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_revoke_reports_not_found() {
        let gate = gate();
        register(&gate, "a@b.com", "secret1").await;
        let session = gate.login("a@b.com", "secret1").await.unwrap();

        gate.revoke(&bearer(&session.refresh_token)).await.unwrap();
        let result = gate.revoke(&bearer(&session.refresh_token)).await;

        assert!(matches!(result, Err(AuthError::TokenRevokedOrUnknown)));
    }

    #[test]
    fn test_authenticate_without_header() {
        let gate = gate();

        assert!(matches!(
            gate.authenticate(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        ));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let gate = gate();
        let token = issue_access_token(
            Uuid::new_v4(),
            &settings().secret,
            chrono::Duration::hours(-1),
        )
        .unwrap();

        assert!(matches!(
            gate.authenticate(&bearer(&token)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_verify_api_key() {
        let gate = gate();

        assert!(gate.verify_api_key(&authorization("ApiKey polka-key")).is_ok());
        assert!(gate.verify_api_key(&authorization("ApiKey other-key")).is_err());
        assert!(matches!(
            gate.verify_api_key(&authorization("Bearer polka-key")),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn test_authorize_owner() {
        let owner = Uuid::new_v4();

        assert!(authorize_owner(owner, owner).is_ok());
        assert!(matches!(
            authorize_owner(Uuid::new_v4(), owner),
            Err(AuthError::Forbidden)
        ));
    }
}
