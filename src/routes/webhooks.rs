use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthGate;
use crate::error::AppError;

const EVENT_USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. Only `user.upgraded` has an
/// effect; other events are acknowledged and ignored.
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Json<WebhookRequest>,
    gate: web::Data<AuthGate>,
) -> Result<HttpResponse, AppError> {
    gate.verify_api_key(req.headers())?;

    if body.event != EVENT_USER_UPGRADED {
        return Ok(HttpResponse::NoContent().finish());
    }

    gate.users()
        .upgrade_to_chirpy_red(body.data.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %body.data.user_id, "User upgraded to Chirpy Red");
    Ok(HttpResponse::NoContent().finish())
}
