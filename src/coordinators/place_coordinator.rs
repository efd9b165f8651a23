use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::errors::ApiError;
use crate::stores::{ImageStore, NewPlace, PlaceStore, UserStore};
use crate::types::db::{place, user};

/// Content of a place to be created, before an owner is attached
pub struct PlaceDraft {
    pub title: String,
    pub description: String,
    pub address: String,
    pub image: String,
}

/// Coordinates mutations that span the places and users collections.
///
/// A place's owner reference and the owner's owned-places set are kept
/// mutually consistent by running both writes inside a single unit of work:
/// either both documents change or neither does. Within the unit, the place
/// write always precedes the owner-set write. Image cleanup happens after
/// commit and is deliberately outside the consistency boundary, since the
/// image store is not transactional with the document store.
pub struct PlaceCoordinator {
    db: DatabaseConnection,
    place_store: Arc<PlaceStore>,
    user_store: Arc<UserStore>,
    image_store: Arc<ImageStore>,
}

impl PlaceCoordinator {
    pub fn new(
        db: DatabaseConnection,
        place_store: Arc<PlaceStore>,
        user_store: Arc<UserStore>,
        image_store: Arc<ImageStore>,
    ) -> Self {
        Self {
            db,
            place_store,
            user_store,
            image_store,
        }
    }

    /// Create a place owned by the caller
    ///
    /// Workflow:
    /// 1. Validate the owner exists
    /// 2. Open a unit of work
    /// 3. Insert the place
    /// 4. Append the place id to the owner's set
    /// 5. Commit, or roll back on any failure
    ///
    /// # Returns
    /// * `Ok(place::Model)` - The created place with its assigned id
    /// * `Err(ApiError)` - NotFound if the owner is missing,
    ///   PersistenceFailure if any write or the commit fails
    pub async fn create_place(
        &self,
        caller_id: &str,
        draft: PlaceDraft,
    ) -> Result<place::Model, ApiError> {
        // Step 1: Validate the referenced owner exists
        let owner = self
            .user_store
            .find_by_id(caller_id)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Creating place failed, please try again.")
            })?
            .ok_or_else(|| ApiError::not_found("Could not find user for the provided id."))?;

        // Step 2: Open the unit of work
        let txn = self.db.begin().await.map_err(|e| {
            ApiError::persistence_failure(format!("Failed to start transaction: {}", e))
        })?;

        // Steps 3-4: Both writes, place first
        let created = match self.apply_create(&txn, &owner, draft).await {
            Ok(place) => place,
            Err(err) => {
                abort(txn).await;
                return Err(err);
            }
        };

        // Step 5: Commit
        txn.commit().await.map_err(|e| {
            ApiError::persistence_failure(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(created)
    }

    async fn apply_create(
        &self,
        txn: &DatabaseTransaction,
        owner: &user::Model,
        draft: PlaceDraft,
    ) -> Result<place::Model, ApiError> {
        let place = self
            .place_store
            .insert(
                txn,
                NewPlace {
                    title: draft.title,
                    description: draft.description,
                    address: draft.address,
                    image: draft.image,
                    owner_id: owner.id.clone(),
                },
            )
            .await?;

        self.user_store.append_place(txn, owner, &place.id).await?;

        Ok(place)
    }

    /// Update the mutable fields of a place owned by the caller
    ///
    /// Only a single document changes, so no unit of work is opened.
    pub async fn update_place(
        &self,
        caller_id: &str,
        place_id: &str,
        title: String,
        description: String,
    ) -> Result<place::Model, ApiError> {
        let place = self
            .place_store
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| {
                ApiError::persistence_failure("Something went wrong, could not update place.")
            })?;

        if place.owner_id != caller_id {
            return Err(ApiError::not_authorized(
                "You are not allowed to edit this place.",
            ));
        }

        self.place_store
            .update_content(&place, title, description)
            .await
    }

    /// Delete a place owned by the caller
    ///
    /// Workflow:
    /// 1. Look up the place and resolve its owner document
    /// 2. Ownership check
    /// 3. Capture the stored image path
    /// 4. Open a unit of work
    /// 5. Delete the place
    /// 6. Remove the place id from the owner's set
    /// 7. Commit, or roll back on any failure
    /// 8. Best-effort delete of the stored image, after commit
    pub async fn delete_place(&self, caller_id: &str, place_id: &str) -> Result<(), ApiError> {
        // Step 1: Look up the place and its owner
        let place = self
            .place_store
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Could not find place for this id."))?;

        let owner = self
            .user_store
            .find_by_id(&place.owner_id)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Something went wrong, could not delete place.")
            })?
            .ok_or_else(|| {
                // A dangling owner reference means the invariant is already broken
                ApiError::persistence_failure("Something went wrong, could not delete place.")
            })?;

        // Step 2: Ownership check
        if owner.id != caller_id {
            return Err(ApiError::not_authorized(
                "You are not allowed to delete this place.",
            ));
        }

        // Step 3: Capture the image path for post-commit cleanup
        let image_path = place.image.clone();

        // Step 4: Open the unit of work
        let txn = self.db.begin().await.map_err(|e| {
            ApiError::persistence_failure(format!("Failed to start transaction: {}", e))
        })?;

        // Steps 5-6: Both writes, place first
        if let Err(err) = self.apply_delete(&txn, &place, &owner).await {
            abort(txn).await;
            return Err(err);
        }

        // Step 7: Commit
        txn.commit().await.map_err(|e| {
            ApiError::persistence_failure(format!("Failed to commit transaction: {}", e))
        })?;

        // Step 8: Image cleanup, outside the consistency boundary
        self.image_store.discard(&image_path).await;

        Ok(())
    }

    async fn apply_delete(
        &self,
        txn: &DatabaseTransaction,
        place: &place::Model,
        owner: &user::Model,
    ) -> Result<(), ApiError> {
        self.place_store.delete(txn, place).await?;
        self.user_store.remove_place(txn, owner, &place.id).await?;
        Ok(())
    }
}

async fn abort(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!(error = %e, "Failed to roll back unit of work");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, EntityTrait, Set};
    use tempfile::TempDir;

    use crate::stores::NewUser;
    use crate::types::db::place::Entity as Place;

    struct TestContext {
        db: DatabaseConnection,
        coordinator: PlaceCoordinator,
        user_store: Arc<UserStore>,
        place_store: Arc<PlaceStore>,
        image_store: Arc<ImageStore>,
        _upload_dir: TempDir,
    }

    async fn setup() -> TestContext {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let upload_dir = tempfile::tempdir().unwrap();
        let user_store = Arc::new(UserStore::new(db.clone()));
        let place_store = Arc::new(PlaceStore::new(db.clone()));
        let image_store = Arc::new(ImageStore::new(upload_dir.path()));

        let coordinator = PlaceCoordinator::new(
            db.clone(),
            place_store.clone(),
            user_store.clone(),
            image_store.clone(),
        );

        TestContext {
            db,
            coordinator,
            user_store,
            place_store,
            image_store,
            _upload_dir: upload_dir,
        }
    }

    async fn create_user(ctx: &TestContext, email: &str) -> crate::types::db::user::Model {
        ctx.user_store
            .insert(NewUser {
                name: "Max".to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$fake".to_string(),
                image: "uploads/images/max.png".to_string(),
            })
            .await
            .unwrap()
    }

    fn sample_draft() -> PlaceDraft {
        PlaceDraft {
            title: "Empire State Building".to_string(),
            description: "One of the most famous sky scrapers in the world".to_string(),
            address: "20 W 34th St, New York, NY 10001".to_string(),
            image: "uploads/images/esb.jpg".to_string(),
        }
    }

    async fn corrupt_places_set(ctx: &TestContext, user: &crate::types::db::user::Model) {
        let mut active: crate::types::db::user::ActiveModel = user.clone().into();
        active.places = Set("not-json".to_string());
        active.update(&ctx.db).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_place_links_both_documents() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        let created = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();

        assert_eq!(created.owner_id, owner.id);

        let stored = ctx.place_store.find_by_id(&created.id).await.unwrap();
        assert!(stored.is_some());

        let owner = ctx.user_store.find_by_id(&owner.id).await.unwrap().unwrap();
        assert_eq!(owner.place_ids().unwrap(), vec![created.id]);
    }

    #[tokio::test]
    async fn test_create_place_for_unknown_owner_is_not_found() {
        let ctx = setup().await;

        let result = ctx.coordinator.create_place("ghost", sample_draft()).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(Place::find().all(&ctx.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rolls_back_place_when_owner_append_fails() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;
        corrupt_places_set(&ctx, &owner).await;

        let result = ctx.coordinator.create_place(&owner.id, sample_draft()).await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
        // The place insert must not survive the failed append
        assert!(Place::find().all(&ctx.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_leaves_owner_untouched_when_place_insert_fails() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        ctx.db.execute_unprepared("DROP TABLE places").await.unwrap();

        let result = ctx.coordinator.create_place(&owner.id, sample_draft()).await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
        let owner = ctx.user_store.find_by_id(&owner.id).await.unwrap().unwrap();
        assert_eq!(owner.place_ids().unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_update_place_applies_mutable_fields() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;
        let created = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();

        let updated = ctx
            .coordinator
            .update_place(
                &owner.id,
                &created.id,
                "Chrysler Building".to_string(),
                "Another famous sky scraper".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Chrysler Building");
        assert_eq!(updated.description, "Another famous sky scraper");
        assert_eq!(updated.address, created.address);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_rejected_and_mutates_nothing() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;
        let intruder = create_user(&ctx, "b@x.com").await;
        let created = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();

        let result = ctx
            .coordinator
            .update_place(
                &intruder.id,
                &created.id,
                "Hijacked".to_string(),
                "Hijacked description".to_string(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::NotAuthorized(_))));
        let stored = ctx
            .place_store
            .find_by_id(&created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, created.title);
    }

    #[tokio::test]
    async fn test_update_missing_place_is_persistence_failure() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        let result = ctx
            .coordinator
            .update_place(
                &owner.id,
                "missing",
                "Title".to_string(),
                "Long enough".to_string(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
    }

    #[tokio::test]
    async fn test_delete_place_unlinks_both_documents() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;
        let created = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();

        ctx.coordinator
            .delete_place(&owner.id, &created.id)
            .await
            .unwrap();

        assert_eq!(ctx.place_store.find_by_id(&created.id).await.unwrap(), None);
        let owner = ctx.user_store.find_by_id(&owner.id).await.unwrap().unwrap();
        assert_eq!(owner.place_ids().unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_delete_missing_place_is_not_found() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        let result = ctx.coordinator.delete_place(&owner.id, "missing").await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_rejected_and_mutates_nothing() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;
        let intruder = create_user(&ctx, "b@x.com").await;
        let created = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();

        let result = ctx.coordinator.delete_place(&intruder.id, &created.id).await;

        assert!(matches!(result, Err(ApiError::NotAuthorized(_))));
        assert!(ctx
            .place_store
            .find_by_id(&created.id)
            .await
            .unwrap()
            .is_some());
        let owner = ctx.user_store.find_by_id(&owner.id).await.unwrap().unwrap();
        assert_eq!(owner.place_ids().unwrap(), vec![created.id]);
    }

    #[tokio::test]
    async fn test_delete_rolls_back_when_owner_pull_fails() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;
        let created = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();
        let owner = ctx.user_store.find_by_id(&owner.id).await.unwrap().unwrap();
        corrupt_places_set(&ctx, &owner).await;

        let result = ctx.coordinator.delete_place(&owner.id, &created.id).await;

        assert!(matches!(result, Err(ApiError::PersistenceFailure(_))));
        // The place delete must not survive the failed pull
        assert!(ctx
            .place_store
            .find_by_id(&created.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_stored_image_after_commit() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        let stored_image = ctx
            .image_store
            .save(Some("esb.jpg"), vec![1, 2, 3])
            .await
            .unwrap();

        let mut draft = sample_draft();
        draft.image = stored_image.clone();
        let created = ctx.coordinator.create_place(&owner.id, draft).await.unwrap();

        ctx.coordinator
            .delete_place(&owner.id, &created.id)
            .await
            .unwrap();

        assert!(!std::path::Path::new(&stored_image).exists());
    }

    #[tokio::test]
    async fn test_delete_succeeds_even_when_image_is_already_gone() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        let mut draft = sample_draft();
        draft.image = "uploads/images/never-existed.jpg".to_string();
        let created = ctx.coordinator.create_place(&owner.id, draft).await.unwrap();

        let result = ctx.coordinator.delete_place(&owner.id, &created.id).await;

        assert!(result.is_ok());
        assert_eq!(ctx.place_store.find_by_id(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_create_appends_to_existing_set() {
        let ctx = setup().await;
        let owner = create_user(&ctx, "a@x.com").await;

        let first = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();
        let second = ctx
            .coordinator
            .create_place(&owner.id, sample_draft())
            .await
            .unwrap();

        let owner = ctx.user_store.find_by_id(&owner.id).await.unwrap().unwrap();
        assert_eq!(owner.place_ids().unwrap(), vec![first.id, second.id]);
    }
}
