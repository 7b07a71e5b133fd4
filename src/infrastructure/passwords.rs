//! Argon2id password hashing.
//!
//! Both operations run on the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

use crate::domain::users::PlainPassword;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("stored password hash is malformed")]
    InvalidHash,
    #[error("password worker failed: {0}")]
    Worker(String),
}

/// Default Argon2id parameters with a zeroed digest no password produces. Checking
/// a candidate against it costs as much as checking a stored hash.
const UNMATCHABLE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash `password` into a PHC string.
pub async fn hash_password(password: &PlainPassword) -> Result<String, PasswordError> {
    let password = password.clone();
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|err| PasswordError::Worker(err.to_string()))?
}

/// Check `candidate` against a stored PHC string.
pub async fn verify_password(
    candidate: &PlainPassword,
    stored_hash: String,
) -> Result<bool, PasswordError> {
    let candidate = candidate.clone();
    tokio::task::spawn_blocking(move || verify_password_blocking(&candidate, &stored_hash))
        .await
        .map_err(|err| PasswordError::Worker(err.to_string()))?
}

/// Spends one verification on `candidate` when there is no stored hash to check.
pub async fn verify_without_hash(candidate: &PlainPassword) -> Result<(), PasswordError> {
    verify_password(candidate, UNMATCHABLE_HASH.to_string())
        .await
        .map(|_| ())
}

fn hash_password_blocking(password: &PlainPassword) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hashing(err.to_string()))
}

fn verify_password_blocking(
    candidate: &PlainPassword,
    stored_hash: &str,
) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHash)?;
    Ok(Argon2::default()
        .verify_password(candidate.expose().as_bytes(), &parsed)
        .is_ok())
}
