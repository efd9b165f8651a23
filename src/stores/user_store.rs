use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::types::db::user::{self, ActiveModel, Entity as User};

/// Fields required to create a user record
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
}

/// UserStore manages user documents, including the denormalized owned-places
/// set. Mutations of the set take an explicit connection so they can join an
/// open unit of work.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find a user by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, ApiError> {
        User::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ApiError::persistence_failure(format!("Database error: {}", e)))
    }

    /// Find a user by email. Emails are stored lowercased, so the lookup key
    /// is case-insensitive.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ApiError> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| ApiError::persistence_failure(format!("Database error: {}", e)))
    }

    /// List all users
    pub async fn all(&self) -> Result<Vec<user::Model>, ApiError> {
        User::find()
            .all(&self.db)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Fetching users failed, please try again later.")
            })
    }

    /// Insert a new user with an empty owned-places set
    ///
    /// # Returns
    /// * `Ok(user::Model)` - The created user with its assigned id
    /// * `Err(ApiError)` - ValidationFailed if the email is already taken,
    ///   PersistenceFailure otherwise
    pub async fn insert(&self, new_user: NewUser) -> Result<user::Model, ApiError> {
        let email = new_user.email.to_lowercase();

        let existing = self.find_by_email(&email).await.map_err(|_| {
            ApiError::persistence_failure("Signing up failed, please try again later.")
        })?;

        if existing.is_some() {
            return Err(ApiError::validation_failed(
                "User exists already, please login instead.",
            ));
        }

        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(new_user.name),
            email: Set(email),
            password_hash: Set(new_user.password_hash),
            image: Set(new_user.image),
            places: Set("[]".to_string()),
            created_at: Set(Utc::now().timestamp()),
        };

        model.insert(&self.db).await.map_err(|e| {
            // A concurrent signup can slip past the lookup; the unique index
            // on email is the authority.
            if e.to_string().contains("UNIQUE") {
                ApiError::validation_failed("User exists already, please login instead.")
            } else {
                ApiError::persistence_failure("Signing up failed, please try again.")
            }
        })
    }

    /// Append a place id to a user's owned-places set
    pub async fn append_place<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: &user::Model,
        place_id: &str,
    ) -> Result<(), ApiError> {
        let mut place_ids = decode_places(owner)?;
        place_ids.push(place_id.to_string());
        self.save_places(conn, owner, place_ids).await
    }

    /// Remove a place id from a user's owned-places set
    pub async fn remove_place<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: &user::Model,
        place_id: &str,
    ) -> Result<(), ApiError> {
        let mut place_ids = decode_places(owner)?;
        place_ids.retain(|id| id != place_id);
        self.save_places(conn, owner, place_ids).await
    }

    async fn save_places<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: &user::Model,
        place_ids: Vec<String>,
    ) -> Result<(), ApiError> {
        let encoded = serde_json::to_string(&place_ids).map_err(|e| {
            ApiError::persistence_failure(format!("Failed to encode owned-places set: {}", e))
        })?;

        let mut active: user::ActiveModel = owner.clone().into();
        active.places = Set(encoded);

        active
            .update(conn)
            .await
            .map_err(|e| ApiError::persistence_failure(format!("Database error: {}", e)))?;

        Ok(())
    }
}

fn decode_places(owner: &user::Model) -> Result<Vec<String>, ApiError> {
    owner.place_ids().map_err(|e| {
        ApiError::persistence_failure(format!(
            "Corrupt owned-places set for user {}: {}",
            owner.id, e
        ))
    })
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").field("db", &"<connection>").finish()
    }
}
