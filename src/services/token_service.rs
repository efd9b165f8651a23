use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::errors::ApiError;
use crate::types::internal::auth::Claims;

/// Manages session token generation and validation
pub struct TokenService {
    jwt_secret: String,
    expiration_seconds: i64,
}

impl TokenService {
    /// Create a new TokenService with the given signing secret
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            expiration_seconds: 3600, // 1 hour
        }
    }

    /// Issue a signed session token for the given user
    ///
    /// # Arguments
    /// * `user_id` - The UUID of the user
    /// * `email` - The user's email address
    ///
    /// # Returns
    /// * `Result<String, ApiError>` - The encoded token, or SigningFailure
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: now + self.expiration_seconds,
            iat: now,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::signing_failure(format!("Failed to sign token: {}", e)))?;

        Ok(token)
    }

    /// Verify a session token and return its claims
    ///
    /// Signature mismatch, malformed structure and expiry all map to the same
    /// terminal authentication failure; there is no refresh mechanism.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::authentication_failed())?;

        Ok(token_data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("expiration_seconds", &self.expiration_seconds)
            .finish()
    }
}
