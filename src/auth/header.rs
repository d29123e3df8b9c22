/// Authorization header parsing
///
/// Accepts exactly `<Scheme> <credential>`: one scheme word, one space, one
/// credential. Anything else is malformed.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Extract the credential following `scheme` from the `Authorization` header
///
/// # Errors
/// - `MissingHeader` if the header is absent or blank
/// - `MalformedHeader` for a wrong scheme, a missing credential or extra segments
pub fn extract_auth_token(headers: &HeaderMap, scheme: &str) -> Result<String, AuthError> {
    let raw = match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader)?,
        None => return Err(AuthError::MissingHeader),
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let parts: Vec<&str> = raw.split(' ').collect();
    match parts.as_slice() {
        [found_scheme, credential] if *found_scheme == scheme && !credential.is_empty() => {
            Ok(credential.to_string())
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_auth_token(headers, BEARER_SCHEME)
}

pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_auth_token(headers, API_KEY_SCHEME)
}
