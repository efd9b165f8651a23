use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};

use crate::errors::ApiError;

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hash a plaintext password with Argon2id and a random salt
///
/// # Returns
/// * `Ok(String)` - The PHC-formatted digest
/// * `Err(ApiError)` - CryptoFailure on hasher error
pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let digest = hasher()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| ApiError::crypto_failure(format!("Password hashing error: {}", e)))?
        .to_string();

    Ok(digest)
}

/// Verify a plaintext password against a stored digest
///
/// A mismatch is not an error; only a malformed digest or an internal hasher
/// failure is.
///
/// # Returns
/// * `Ok(bool)` - Whether the password matches
/// * `Err(ApiError)` - CryptoFailure on malformed digest or hasher error
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(digest)
        .map_err(|e| ApiError::crypto_failure(format!("Malformed password digest: {}", e)))?;

    match hasher().verify_password(plaintext.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::crypto_failure(format!(
            "Password verification error: {}",
            e
        ))),
    }
}
