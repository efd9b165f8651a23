use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::TokenService;
use crate::types::internal::auth::CallerIdentity;

/// Request interceptor for protected endpoints.
///
/// Extracts the bearer credential from the raw `Authorization` header and
/// verifies it, yielding the caller identity for downstream ownership checks.
/// Preflight (OPTIONS) requests never reach the gate; the CORS middleware
/// answers them at the boundary.
pub struct AuthGate {
    token_service: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// # Returns
    /// * `Ok(CallerIdentity)` - The verified caller
    /// * `Err(ApiError)` - AuthenticationFailed if the header is absent or
    ///   malformed, or the token is invalid or expired
    pub fn authenticate(&self, header: Option<&str>) -> Result<CallerIdentity, ApiError> {
        let header = header.ok_or_else(ApiError::authentication_failed)?;

        let mut parts = header.split_whitespace();
        let token = match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => return Err(ApiError::authentication_failed()),
        };

        let claims = self.token_service.verify(token)?;

        Ok(CallerIdentity::from(claims))
    }
}
