//! Argon2id password hashes in PHC string format.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::database::DatabaseError;

pub fn hash_password(password: &str) -> Result<String, DatabaseError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DatabaseError::PasswordHash(format!("failed to hash password: {e}")))
}

/// `Ok(false)` for a wrong password, `Err` only for an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, DatabaseError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| DatabaseError::PasswordHash(format!("invalid password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
