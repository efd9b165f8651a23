use poem_openapi::payload::Json;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{ApiResponse, Multipart, Object};
use serde::{Deserialize, Serialize};

use crate::types::db::user;

/// A user as returned to API clients. The password hash is never exposed.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID (UUID)
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Stored image path
    pub image: String,

    /// IDs of the places owned by this user
    pub places: Vec<String>,
}

impl UserResponse {
    /// Build the response model, decoding the owned-places set
    pub fn from_model(model: &user::Model) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: model.id.clone(),
            name: model.name.clone(),
            email: model.email.clone(),
            image: model.image.clone(),
            places: model.place_ids()?,
        })
    }
}

/// Response envelope for the user listing
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// Multipart body for signup
#[derive(Debug, Multipart)]
pub struct SignupForm {
    /// Display name
    pub name: String,

    /// Email address (unique, case-insensitive)
    pub email: String,

    /// Plaintext password (at least 6 characters)
    pub password: String,

    /// Profile image file
    pub image: Upload,
}

/// Request model for login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Response model carrying a freshly minted session token
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// User ID (UUID)
    #[oai(rename = "userId")]
    pub user_id: String,

    /// Email address of the authenticated user
    pub email: String,

    /// Signed session token (1 hour expiry)
    pub token: String,
}

/// API response for signup
#[derive(ApiResponse)]
pub enum SignupApiResponse {
    /// Account created
    #[oai(status = 201)]
    Created(Json<AuthResponse>),
}
