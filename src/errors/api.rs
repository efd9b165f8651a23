use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

/// Standardized error response body
#[derive(Object, Debug)]
pub struct ErrorBody {
    /// Human-readable error message
    pub message: String,
}

/// Error kinds surfaced by the API. Each variant carries a fixed HTTP status
/// and a `{message}` body; there is no further structure.
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Malformed or missing required input fields
    #[oai(status = 422)]
    ValidationFailed(Json<ErrorBody>),

    /// Missing, malformed, invalid or expired bearer credential
    #[oai(status = 403)]
    AuthenticationFailed(Json<ErrorBody>),

    /// Authenticated caller does not own the resource
    #[oai(status = 401)]
    NotAuthorized(Json<ErrorBody>),

    /// Referenced place or owner does not exist
    #[oai(status = 404)]
    NotFound(Json<ErrorBody>),

    /// Underlying store operation failed
    #[oai(status = 500)]
    PersistenceFailure(Json<ErrorBody>),

    /// Password hashing or verification failed
    #[oai(status = 500)]
    CryptoFailure(Json<ErrorBody>),

    /// Token signing failed
    #[oai(status = 500)]
    SigningFailure(Json<ErrorBody>),
}

impl ApiError {
    /// Create a ValidationFailed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        ApiError::ValidationFailed(Json(ErrorBody {
            message: message.into(),
        }))
    }

    /// Create an AuthenticationFailed error
    pub fn authentication_failed() -> Self {
        ApiError::AuthenticationFailed(Json(ErrorBody {
            message: "Authentication failed.".to_string(),
        }))
    }

    /// Create an AuthenticationFailed error for a failed login
    pub fn invalid_credentials() -> Self {
        ApiError::AuthenticationFailed(Json(ErrorBody {
            message: "Invalid credentials, could not log you in.".to_string(),
        }))
    }

    /// Create a NotAuthorized error
    pub fn not_authorized(message: impl Into<String>) -> Self {
        ApiError::NotAuthorized(Json(ErrorBody {
            message: message.into(),
        }))
    }

    /// Create a NotFound error
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(Json(ErrorBody {
            message: message.into(),
        }))
    }

    /// Create a PersistenceFailure error
    pub fn persistence_failure(message: impl Into<String>) -> Self {
        ApiError::PersistenceFailure(Json(ErrorBody {
            message: message.into(),
        }))
    }

    /// Create a CryptoFailure error
    pub fn crypto_failure(message: impl Into<String>) -> Self {
        ApiError::CryptoFailure(Json(ErrorBody {
            message: message.into(),
        }))
    }

    /// Create a SigningFailure error
    pub fn signing_failure(message: impl Into<String>) -> Self {
        ApiError::SigningFailure(Json(ErrorBody {
            message: message.into(),
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationFailed(json) => &json.0.message,
            ApiError::AuthenticationFailed(json) => &json.0.message,
            ApiError::NotAuthorized(json) => &json.0.message,
            ApiError::NotFound(json) => &json.0.message,
            ApiError::PersistenceFailure(json) => &json.0.message,
            ApiError::CryptoFailure(json) => &json.0.message,
            ApiError::SigningFailure(json) => &json.0.message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
