/// Password Hashing and Verification
///
/// bcrypt with a random per-hash salt and a fixed work factor. Only the hash
/// is ever stored; verification needs nothing but the hash.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AuthError;

/// Well-formed hash at `DEFAULT_COST` that no submitted password is checked
/// into. Logins for unknown emails verify against it so both failure paths
/// pay the same bcrypt cost.
const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$EixZaYVK1fsbw1ZfbX3OXePaWxn96p36WQoeG6Lruj3vjPGga31lW";

/// Hash a password using bcrypt
///
/// # Errors
/// `Hashing` if bcrypt fails internally (salt generation)
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its bcrypt hash
///
/// An empty password never verifies, even against a hash of the empty string.
///
/// # Errors
/// `CredentialInvalid` for a wrong password, a malformed hash or an empty password
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::CredentialInvalid);
    }

    match verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::CredentialInvalid),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            Err(AuthError::CredentialInvalid)
        }
    }
}

/// Run a full bcrypt verification whose outcome is discarded
pub fn verify_dummy_password(password: &str) {
    let _ = verify_password(password, DUMMY_PASSWORD_HASH);
}
