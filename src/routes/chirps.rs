/// Chirp Routes
///
/// Posting, listing, fetching and deleting chirps. Only the author may
/// delete a chirp.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::authorize_owner;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::store::ChirpRepository;

const MAX_CHIRP_LENGTH: usize = 140;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ChirpFilter {
    pub author_id: Option<Uuid>,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid chirp ID".to_string()))
}

/// POST /api/chirps
///
/// **Requires a valid access token.** The caller becomes the author.
///
/// # Errors
/// - 401: Missing or invalid access token (handled by middleware)
/// - 400: Body longer than 140 characters
pub async fn create_chirp(
    identity: web::ReqData<AuthenticatedUser>,
    form: web::Json<ChirpRequest>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    if form.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::Validation("Chirp is too long".to_string()));
    }

    let chirp = chirps.create(identity.user_id, &form.body).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %chirp.user_id, "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps[?author_id=<uuid>]
pub async fn list_chirps(
    filter: web::Query<ChirpFilter>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let chirps = chirps.list(filter.author_id).await?;

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
///
/// # Errors
/// - 400: Malformed chirp id
/// - 404: No such chirp
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps
        .find(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// **Requires a valid access token** belonging to the chirp's author.
///
/// # Errors
/// - 401: Missing or invalid access token (handled by middleware)
/// - 400: Malformed chirp id
/// - 404: No such chirp
/// - 403: Chirp belongs to another user
pub async fn delete_chirp(
    identity: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps
        .find(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("chirp".to_string()))?;

    authorize_owner(identity.user_id, chirp.user_id)?;

    if !chirps.delete(chirp_id).await? {
        return Err(AppError::NotFound("chirp".to_string()));
    }

    tracing::info!(chirp_id = %chirp_id, user_id = %identity.user_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
