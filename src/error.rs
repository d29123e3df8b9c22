/// Error Handling Module
///
/// Unified error handling for the service:
/// 1. Authentication error taxonomy (`AuthError`)
/// 2. Unified application error (`AppError`) used by route handlers
/// 3. HTTP response mapping with structured logging
///
/// Authentication failures are collapsed into a single generic 401 body.
/// The precise kind is only ever written to the server log. Handler errors
/// are logged inside the request span, so that line carries both the
/// span's `request_id` and the `error_id` returned to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// ============================================================================
/// 1. AUTHENTICATION ERRORS
/// ============================================================================

/// Failures of the session authentication subsystem
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Never distinguished outward.
    #[error("invalid credentials")]
    CredentialInvalid,
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("malformed token")]
    TokenMalformed,
    #[error("invalid token signature")]
    TokenInvalid,
    #[error("token has expired")]
    TokenExpired,
    #[error("token issuer mismatch")]
    IssuerMismatch,
    /// Unknown, revoked, or expired refresh token
    #[error("refresh token revoked or unknown")]
    TokenRevokedOrUnknown,
    #[error("not the owner of this resource")]
    Forbidden,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("random source failure: {0}")]
    Entropy(String),
    #[error("token store failure: {0}")]
    Persistence(String),
}

impl AuthError {
    /// Whether this failure surfaces as a generic 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::CredentialInvalid
                | AuthError::MissingHeader
                | AuthError::MalformedHeader
                | AuthError::TokenMalformed
                | AuthError::TokenInvalid
                | AuthError::TokenExpired
                | AuthError::IssuerMismatch
                | AuthError::TokenRevokedOrUnknown
        )
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type returned by route handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Validation(String),
    #[error("duplicate entry: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(String),
    /// Server misconfiguration detected while handling a request
    #[error("internal error: {0}")]
    Internal(String),
}

/// ============================================================================
/// 3. HTTP RESPONSE MAPPING
/// ============================================================================

/// Error response body
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, matches the `error_id` field of the server log line
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts errors to HTTP responses and writes the server-side log line
pub trait ErrorHandler {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, error_id: &str);
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            AppError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse) {
        let status = self.status();
        let (code, message) = match self {
            AppError::Auth(AuthError::CredentialInvalid) => (
                "UNAUTHORIZED",
                "Incorrect email or password".to_string(),
            ),
            AppError::Auth(AuthError::Forbidden) => (
                "FORBIDDEN",
                "Not allowed to modify this resource".to_string(),
            ),
            AppError::Auth(e) if e.is_unauthorized() => {
                ("UNAUTHORIZED", "Unauthorized".to_string())
            }
            AppError::Auth(_) | AppError::Database(_) | AppError::Internal(_) => {
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(_) => ("DUPLICATE_ENTRY", self.to_string()),
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
        };

        let body = ErrorResponse::new(
            error_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, body)
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AppError::Auth(AuthError::CredentialInvalid) => {
                tracing::warn!(error_id = error_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) if e.is_unauthorized() => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Auth(AuthError::Forbidden) => {
                tracing::warn!(error_id = error_id, error = %self, "Authorization denied");
            }
            AppError::Validation(_) | AppError::Conflict(_) | AppError::NotFound(_) => {
                tracing::info!(error_id = error_id, error = %self, "Request rejected");
            }
            AppError::Auth(_) | AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error_id = error_id, error = %self, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, body) = <Self as ErrorHandler>::error_response(self, &error_id);

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.status()
    }
}
