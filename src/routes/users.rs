/// User Routes
///
/// Account creation and credential updates.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{hash_password, AuthGate};
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::store::PublicUser;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("email must not be empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("password must not be empty".to_string()));
        }
        Ok(())
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Empty email or password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    gate: web::Data<AuthGate>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;

    let hashed_password = hash_password(&form.password)?;
    let user = gate.users().create(&form.email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok(HttpResponse::Created().json(PublicUser::from(user)))
}

/// PUT /api/users
///
/// **Requires a valid access token.** Replaces the caller's email and password.
///
/// # Errors
/// - 401: Missing or invalid access token (handled by middleware)
/// - 400: Empty email or password
/// - 404: Account no longer exists
pub async fn update_user(
    identity: web::ReqData<AuthenticatedUser>,
    form: web::Json<CredentialsRequest>,
    gate: web::Data<AuthGate>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;

    let hashed_password = hash_password(&form.password)?;
    let user = gate
        .users()
        .update_credentials(identity.user_id, &form.email, &hashed_password)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %user.id, "User credentials updated");

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}
