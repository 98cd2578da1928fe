//! Argon2id password hashes.
//!
//! Stored as PHC strings (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`), so
//! the parameters travel with each hash and can be raised later without
//! breaking existing accounts.

use crate::error::{AuthError, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt and the default Argon2id cost.
///
/// # Errors
///
/// Returns [`AuthError::InternalError`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_password_with(password, &salt, Params::default())
}

/// Hash a password with an explicit salt and cost parameters.
///
/// # Errors
///
/// Returns [`AuthError::InternalError`] for a salt shorter than 8 bytes or
/// if hashing fails.
pub fn hash_password_with(password: &str, salt: &[u8], params: Params) -> Result<String> {
    let salt = SaltString::encode_b64(salt)
        .map_err(|e| AuthError::InternalError(format!("Invalid salt: {e}")))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {e}")))
}

/// Check a password against a stored hash.
///
/// A stored value that is not a PHC string never matches.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("Stored password hash has an unknown format");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
