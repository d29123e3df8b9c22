/// Access token issuance and validation
///
/// Stateless HS256 JWTs. Validity depends only on the signature, the issuer
/// tag and the expiry; nothing is stored server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ACCESS_TOKEN_ISSUER};
use crate::error::AuthError;

/// Issue a signed access token for `user_id`, valid for `ttl`
///
/// # Errors
/// `Signing` if the encoder fails
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Validate an access token and return the user it was issued for
///
/// # Errors
/// - `TokenInvalid` on a bad signature
/// - `TokenExpired` once `exp` has passed (no leeway)
/// - `IssuerMismatch` for tokens issued for another purpose
/// - `TokenMalformed` for anything that does not parse
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        let kind = match e.kind() {
            ErrorKind::InvalidSignature => AuthError::TokenInvalid,
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
            _ => AuthError::TokenMalformed,
        };
        tracing::debug!(error = %e, "Access token rejected");
        kind
    })?;

    // jsonwebtoken only rejects once `exp < now`
    if data.claims.exp <= Utc::now().timestamp() {
        tracing::debug!(exp = data.claims.exp, "Access token rejected at expiry");
        return Err(AuthError::TokenExpired);
    }

    data.claims.user_id()
}
