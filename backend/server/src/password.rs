//! Argon2id password hashing.
//!
//! Hashes are PHC strings with a random salt, so the parameters travel with
//! the hash. Both operations are CPU bound and run on the blocking pool.
use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task::spawn_blocking;

use crate::error::AppError;

pub async fn hash_password(password: String) -> Result<String, AppError> {
    spawn_blocking(move || hash(&password))
        .await
        .map_err(|e| AppError::InternalError(Box::new(e)))?
        .map_err(|e| AppError::InternalError(Box::new(e)))
}

/// `false` for a wrong password and for a stored hash that cannot be parsed.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    spawn_blocking(move || verify(&password, &stored_hash))
        .await
        .map_err(|e| AppError::InternalError(Box::new(e)))
}

fn hash(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

fn verify(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
