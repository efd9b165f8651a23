use poem_openapi::payload::Json;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{ApiResponse, Multipart, Object};
use serde::{Deserialize, Serialize};

use crate::types::db::place;

/// A place as returned to API clients
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PlaceResponse {
    /// Place ID (UUID)
    pub id: String,

    /// Title of the place
    pub title: String,

    /// Free-form description (at least 5 characters)
    pub description: String,

    /// Street address
    pub address: String,

    /// Stored image path
    pub image: String,

    /// User ID of the owner
    pub owner: String,
}

impl From<place::Model> for PlaceResponse {
    fn from(model: place::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            address: model.address,
            image: model.image,
            owner: model.owner_id,
        }
    }
}

/// Response envelope for a single place
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PlaceEnvelope {
    pub place: PlaceResponse,
}

/// Response envelope for a list of places
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PlaceListResponse {
    pub places: Vec<PlaceResponse>,
}

/// Multipart body for place creation
#[derive(Debug, Multipart)]
pub struct CreatePlaceForm {
    /// Title of the place
    pub title: String,

    /// Free-form description (at least 5 characters)
    pub description: String,

    /// Street address
    pub address: String,

    /// Image file for the place
    pub image: Upload,
}

/// Request model for place updates
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdatePlaceRequest {
    /// New title
    pub title: String,

    /// New description (at least 5 characters)
    pub description: String,
}

/// Confirmation message returned by delete
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct DeletePlaceResponse {
    pub message: String,
}

/// API response for place creation
#[derive(ApiResponse)]
pub enum CreatePlaceApiResponse {
    /// Place created and linked to its owner
    #[oai(status = 201)]
    Created(Json<PlaceEnvelope>),
}
