/// Session Routes
///
/// Password login, access token refresh, and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthGate;
use crate::error::AppError;
use crate::store::PublicUser;

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the public user plus both session tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: Unknown email or wrong password (same body for both)
/// - 500: Token could not be signed or persisted
pub async fn login(
    form: web::Json<LoginRequest>,
    gate: web::Data<AuthGate>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let session = gate.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: session.user.into(),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. Returns a new access
/// token; the refresh token stays valid.
///
/// # Errors
/// - 401: Missing, unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    gate: web::Data<AuthGate>,
) -> Result<HttpResponse, AppError> {
    let token = gate.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`.
///
/// # Errors
/// - 401: Missing, unknown or already revoked refresh token
pub async fn revoke(
    req: HttpRequest,
    gate: web::Data<AuthGate>,
) -> Result<HttpResponse, AppError> {
    gate.revoke(req.headers()).await?;

    tracing::info!("Session revoked");
    Ok(HttpResponse::NoContent().finish())
}
