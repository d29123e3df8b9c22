/// Authentication module
///
/// Password hashing, access token (JWT) issuance and validation,
/// refresh token management, and the `AuthGate` façade over them.

mod claims;
mod gate;
mod header;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{Claims, ACCESS_TOKEN_ISSUER};
pub use gate::{authorize_owner, AuthGate, LoginSession};
pub use header::{extract_api_key, extract_auth_token, extract_bearer_token};
pub use jwt::{issue_access_token, validate_access_token};
pub use password::{hash_password, verify_password};
pub use refresh_token::{
    generate_refresh_token, revoke_refresh_token, save_refresh_token, validate_refresh_token,
};
