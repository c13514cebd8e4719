//! Argon2id password hashing, verification, and strength validation.
//!
//! Hashes are stored as PHC strings so that algorithm parameters and salt
//! travel with the hash. Reset tokens are hashed the same way.

use crate::errors::{AppError, AppResult};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hash a plaintext secret using Argon2id with a random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Password(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a plaintext secret against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; malformed hashes are errors.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AppError::Password(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Password(e.to_string())),
    }
}

/// Minimum-length check applied to every new password.
pub fn validate_password_strength(password: &str, min_length: usize) -> AppResult<()> {
    if password.trim().is_empty() {
        return Err(AppError::Password("Password must not be empty".into()));
    }
    if password.chars().count() < min_length {
        return Err(AppError::Password(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}
