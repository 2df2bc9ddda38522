use crate::errors::ServiceError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{error, instrument};

/// Hashes a plain-text password into an Argon2 PHC string.
#[instrument(skip(password))]
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!(error = %err, "Argon2 password hashing failed");
            ServiceError::HashError(err.to_string())
        })
}

/// Checks `password` against a stored hash. A mismatch is `Ok(false)`.
#[instrument(skip(stored_hash, password))]
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| {
        error!(error = %err, "Stored password hash is malformed");
        ServiceError::HashError(err.to_string())
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => {
            error!(error = %err, "Argon2 password verification failed");
            Err(ServiceError::HashError(err.to_string()))
        }
    }
}

/// Runs [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| ServiceError::InternalError(format!("hashing task failed: {}", err)))?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    stored_hash: String,
    password: String,
) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
        .await
        .map_err(|err| ServiceError::InternalError(format!("verification task failed: {}", err)))?
}
