use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::types::db::place::{self, ActiveModel, Entity as Place};

/// Fields required to create a place record
pub struct NewPlace {
    pub title: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub owner_id: String,
}

/// PlaceStore manages place documents. Writes that participate in the
/// cross-collection consistency protocol take an explicit connection so the
/// coordinator can run them inside a unit of work.
pub struct PlaceStore {
    db: DatabaseConnection,
}

impl PlaceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find a place by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<place::Model>, ApiError> {
        Place::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Something went wrong, could not find place.")
            })
    }

    /// List all places owned by the given user
    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<place::Model>, ApiError> {
        Place::find()
            .filter(place::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Fetching places failed, please try again later.")
            })
    }

    /// Insert a new place inside the given unit of work
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        new_place: NewPlace,
    ) -> Result<place::Model, ApiError> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(new_place.title),
            description: Set(new_place.description),
            address: Set(new_place.address),
            image: Set(new_place.image),
            owner_id: Set(new_place.owner_id),
            created_at: Set(Utc::now().timestamp()),
        };

        model.insert(conn).await.map_err(|_| {
            ApiError::persistence_failure("Creating place failed, please try again.")
        })
    }

    /// Update the mutable fields of a place. Only one document changes, so no
    /// unit of work is required.
    pub async fn update_content(
        &self,
        place: &place::Model,
        title: String,
        description: String,
    ) -> Result<place::Model, ApiError> {
        let mut active: place::ActiveModel = place.clone().into();
        active.title = Set(title);
        active.description = Set(description);

        active.update(&self.db).await.map_err(|_| {
            ApiError::persistence_failure("Something went wrong, could not update place.")
        })
    }

    /// Delete a place inside the given unit of work
    pub async fn delete<C: ConnectionTrait>(
        &self,
        conn: &C,
        place: &place::Model,
    ) -> Result<(), ApiError> {
        Place::delete_by_id(&place.id)
            .exec(conn)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Something went wrong, could not delete place.")
            })?;

        Ok(())
    }
}

impl std::fmt::Debug for PlaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceStore").field("db", &"<connection>").finish()
    }
}
