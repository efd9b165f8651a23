use poem_openapi::param::{Header, Path};
use poem_openapi::payload::Json;
use poem_openapi::{OpenApi, Tags};
use std::sync::Arc;

use crate::api::invalid_inputs;
use crate::coordinators::{PlaceCoordinator, PlaceDraft};
use crate::errors::ApiError;
use crate::services::AuthGate;
use crate::stores::{ImageStore, PlaceStore};
use crate::types::dto::places::{
    CreatePlaceApiResponse, CreatePlaceForm, DeletePlaceResponse, PlaceEnvelope, PlaceListResponse,
    UpdatePlaceRequest,
};

/// Place resource endpoints
pub struct PlacesApi {
    place_store: Arc<PlaceStore>,
    image_store: Arc<ImageStore>,
    coordinator: Arc<PlaceCoordinator>,
    auth_gate: Arc<AuthGate>,
}

impl PlacesApi {
    pub fn new(
        place_store: Arc<PlaceStore>,
        image_store: Arc<ImageStore>,
        coordinator: Arc<PlaceCoordinator>,
        auth_gate: Arc<AuthGate>,
    ) -> Self {
        Self {
            place_store,
            image_store,
            coordinator,
            auth_gate,
        }
    }
}

/// API tags for place endpoints
#[derive(Tags)]
enum PlaceTags {
    /// Place management endpoints
    Places,
}

#[OpenApi]
impl PlacesApi {
    /// Fetch a single place by id
    #[oai(path = "/places/:place_id", method = "get", tag = "PlaceTags::Places")]
    async fn get_place(&self, place_id: Path<String>) -> Result<Json<PlaceEnvelope>, ApiError> {
        let place = self
            .place_store
            .find_by_id(&place_id.0)
            .await?
            .ok_or_else(|| ApiError::not_found("Could not find a place for the provided id."))?;

        Ok(Json(PlaceEnvelope {
            place: place.into(),
        }))
    }

    /// List all places owned by a user
    #[oai(path = "/places/user/:user_id", method = "get", tag = "PlaceTags::Places")]
    async fn get_places_by_user(
        &self,
        user_id: Path<String>,
    ) -> Result<Json<PlaceListResponse>, ApiError> {
        let places = self.place_store.find_by_owner(&user_id.0).await?;

        Ok(Json(PlaceListResponse {
            places: places.into_iter().map(Into::into).collect(),
        }))
    }

    /// Create a place owned by the authenticated caller
    #[oai(path = "/places", method = "post", tag = "PlaceTags::Places")]
    async fn create_place(
        &self,
        authorization: Header<Option<String>>,
        form: CreatePlaceForm,
    ) -> Result<CreatePlaceApiResponse, ApiError> {
        let caller = self.auth_gate.authenticate(authorization.0.as_deref())?;

        if form.title.trim().is_empty()
            || form.description.chars().count() < 5
            || form.address.trim().is_empty()
        {
            return Err(invalid_inputs());
        }

        let file_name = form.image.file_name().map(str::to_string);
        let bytes = form.image.into_vec().await.map_err(|e| {
            ApiError::persistence_failure(format!("Could not read the uploaded image: {}", e))
        })?;
        let stored_image = self.image_store.save(file_name.as_deref(), bytes).await?;

        let draft = PlaceDraft {
            title: form.title,
            description: form.description,
            address: form.address,
            image: stored_image.clone(),
        };

        match self.coordinator.create_place(&caller.user_id, draft).await {
            Ok(place) => Ok(CreatePlaceApiResponse::Created(Json(PlaceEnvelope {
                place: place.into(),
            }))),
            Err(err) => {
                // The upload was already stored; clean it up before failing
                self.image_store.discard(&stored_image).await;
                Err(err)
            }
        }
    }

    /// Update the title and description of an owned place
    #[oai(path = "/places/:place_id", method = "patch", tag = "PlaceTags::Places")]
    async fn update_place(
        &self,
        authorization: Header<Option<String>>,
        place_id: Path<String>,
        body: Json<UpdatePlaceRequest>,
    ) -> Result<Json<PlaceEnvelope>, ApiError> {
        let caller = self.auth_gate.authenticate(authorization.0.as_deref())?;

        if body.title.trim().is_empty() || body.description.chars().count() < 5 {
            return Err(invalid_inputs());
        }

        let place = self
            .coordinator
            .update_place(
                &caller.user_id,
                &place_id.0,
                body.title.clone(),
                body.description.clone(),
            )
            .await?;

        Ok(Json(PlaceEnvelope {
            place: place.into(),
        }))
    }

    /// Delete an owned place together with its owner-side reference
    #[oai(path = "/places/:place_id", method = "delete", tag = "PlaceTags::Places")]
    async fn delete_place(
        &self,
        authorization: Header<Option<String>>,
        place_id: Path<String>,
    ) -> Result<Json<DeletePlaceResponse>, ApiError> {
        let caller = self.auth_gate.authenticate(authorization.0.as_deref())?;

        self.coordinator
            .delete_place(&caller.user_id, &place_id.0)
            .await?;

        Ok(Json(DeletePlaceResponse {
            message: "Deleted place.".to_string(),
        }))
    }
}
