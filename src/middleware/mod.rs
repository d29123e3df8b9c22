/// Middleware module
///
/// Access token authentication and per-request logging.

mod auth_middleware;
mod request_logger;

pub use auth_middleware::{AuthMiddleware, AuthenticatedUser};
pub use request_logger::RequestLogger;
