use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::error::AppError;

/// Hashes a password with Argon2 and a fresh random salt, returning the PHC string.
/// Runs on the blocking pool so request workers keep serving.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    })
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?
}

/// Checks a password against a stored PHC hash.
/// A mismatch is `Ok(false)`; only an unreadable hash is an error.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let (password, password_hash) = (password.to_owned(), password_hash.to_owned());
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))?
}
