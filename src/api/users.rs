use poem_openapi::payload::Json;
use poem_openapi::{OpenApi, Tags};
use std::sync::Arc;

use crate::api::{invalid_inputs, is_valid_email};
use crate::errors::ApiError;
use crate::services::password_service;
use crate::services::TokenService;
use crate::stores::{ImageStore, NewUser, UserStore};
use crate::types::dto::users::{
    AuthResponse, LoginRequest, SignupApiResponse, SignupForm, UserListResponse, UserResponse,
};

/// User resource endpoints
pub struct UsersApi {
    user_store: Arc<UserStore>,
    image_store: Arc<ImageStore>,
    token_service: Arc<TokenService>,
}

impl UsersApi {
    pub fn new(
        user_store: Arc<UserStore>,
        image_store: Arc<ImageStore>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            user_store,
            image_store,
            token_service,
        }
    }
}

/// API tags for user endpoints
#[derive(Tags)]
enum UserTags {
    /// User management and authentication endpoints
    Users,
}

#[OpenApi]
impl UsersApi {
    /// List all users, without password material
    #[oai(path = "/users", method = "get", tag = "UserTags::Users")]
    async fn get_users(&self) -> Result<Json<UserListResponse>, ApiError> {
        let users = self.user_store.all().await?;

        let users = users
            .iter()
            .map(UserResponse::from_model)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                ApiError::persistence_failure(format!("Corrupt owned-places set: {}", e))
            })?;

        Ok(Json(UserListResponse { users }))
    }

    /// Create an account and mint a session token
    #[oai(path = "/users/signup", method = "post", tag = "UserTags::Users")]
    async fn signup(&self, form: SignupForm) -> Result<SignupApiResponse, ApiError> {
        let email = form.email.trim().to_lowercase();

        if form.name.trim().is_empty()
            || !is_valid_email(&email)
            || form.password.chars().count() < 6
        {
            return Err(invalid_inputs());
        }

        let existing = self.user_store.find_by_email(&email).await.map_err(|_| {
            ApiError::persistence_failure("Signing up failed, please try again later.")
        })?;
        if existing.is_some() {
            return Err(ApiError::validation_failed(
                "User exists already, please login instead.",
            ));
        }

        let password_hash = password_service::hash_password(&form.password)
            .map_err(|_| ApiError::crypto_failure("Could not create user, please try again."))?;

        let file_name = form.image.file_name().map(str::to_string);
        let bytes = form.image.into_vec().await.map_err(|e| {
            ApiError::persistence_failure(format!("Could not read the uploaded image: {}", e))
        })?;
        let stored_image = self.image_store.save(file_name.as_deref(), bytes).await?;

        let user = match self
            .user_store
            .insert(NewUser {
                name: form.name,
                email,
                password_hash,
                image: stored_image.clone(),
            })
            .await
        {
            Ok(user) => user,
            Err(err) => {
                // The upload was already stored; clean it up before failing
                self.image_store.discard(&stored_image).await;
                return Err(err);
            }
        };

        let token = self
            .token_service
            .issue(&user.id, &user.email)
            .map_err(|_| ApiError::signing_failure("Signing up failed, please try again."))?;

        Ok(SignupApiResponse::Created(Json(AuthResponse {
            user_id: user.id,
            email: user.email,
            token,
        })))
    }

    /// Authenticate with email and password and mint a session token
    #[oai(path = "/users/login", method = "post", tag = "UserTags::Users")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<AuthResponse>, ApiError> {
        let email = body.email.trim().to_lowercase();

        let user = self
            .user_store
            .find_by_email(&email)
            .await
            .map_err(|_| {
                ApiError::persistence_failure("Logging in failed, please try again later.")
            })?
            .ok_or_else(ApiError::invalid_credentials)?;

        let password_matches = password_service::verify_password(&body.password, &user.password_hash)
            .map_err(|_| {
                ApiError::crypto_failure(
                    "Could not log you in, please check your credentials and try again.",
                )
            })?;

        if !password_matches {
            return Err(ApiError::invalid_credentials());
        }

        let token = self
            .token_service
            .issue(&user.id, &user.email)
            .map_err(|_| ApiError::signing_failure("Logging in failed, please try again."))?;

        Ok(Json(AuthResponse {
            user_id: user.id,
            email: user.email,
            token,
        }))
    }
}
