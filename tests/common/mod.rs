// Common test utilities for integration tests

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tempfile::TempDir;

use places_backend::coordinators::PlaceCoordinator;
use places_backend::services::{AuthGate, TokenService};
use places_backend::stores::{ImageStore, NewUser, PlaceStore, UserStore};
use places_backend::types::db::user;

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";

/// Everything needed to exercise the service without an HTTP listener
pub struct TestApp {
    pub db: DatabaseConnection,
    pub user_store: Arc<UserStore>,
    pub place_store: Arc<PlaceStore>,
    pub image_store: Arc<ImageStore>,
    pub token_service: Arc<TokenService>,
    pub auth_gate: Arc<AuthGate>,
    pub coordinator: Arc<PlaceCoordinator>,
    _upload_dir: TempDir,
}

/// Creates a test database with migrations applied and wires up the full
/// store/service/coordinator stack on top of it
pub async fn setup_test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

    let user_store = Arc::new(UserStore::new(db.clone()));
    let place_store = Arc::new(PlaceStore::new(db.clone()));
    let image_store = Arc::new(ImageStore::new(upload_dir.path()));
    let token_service = Arc::new(TokenService::new(TEST_JWT_SECRET.to_string()));
    let auth_gate = Arc::new(AuthGate::new(token_service.clone()));

    let coordinator = Arc::new(PlaceCoordinator::new(
        db.clone(),
        place_store.clone(),
        user_store.clone(),
        image_store.clone(),
    ));

    TestApp {
        db,
        user_store,
        place_store,
        image_store,
        token_service,
        auth_gate,
        coordinator,
        _upload_dir: upload_dir,
    }
}

/// Inserts a user with a real password hash
pub async fn create_user(app: &TestApp, name: &str, email: &str, password: &str) -> user::Model {
    let password_hash =
        places_backend::services::password_service::hash_password(password).unwrap();

    app.user_store
        .insert(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            image: "uploads/images/avatar.png".to_string(),
        })
        .await
        .expect("Failed to create user")
}

/// Asserts the bidirectional consistency invariant over the whole store:
/// every place id in a user's set resolves to a place owned by that user,
/// appearing exactly once, and every place appears in its owner's set.
pub async fn assert_bidirectional_consistency(app: &TestApp) {
    use sea_orm::EntityTrait;

    let users = places_backend::types::db::user::Entity::find()
        .all(&app.db)
        .await
        .unwrap();
    let places = places_backend::types::db::place::Entity::find()
        .all(&app.db)
        .await
        .unwrap();

    for user in &users {
        let place_ids = user.place_ids().expect("owned-places set must decode");
        for place_id in &place_ids {
            assert_eq!(
                place_ids.iter().filter(|id| *id == place_id).count(),
                1,
                "place {} appears more than once in user {}'s set",
                place_id,
                user.id
            );

            let place = places
                .iter()
                .find(|p| &p.id == place_id)
                .unwrap_or_else(|| panic!("user {} references missing place {}", user.id, place_id));
            assert_eq!(
                place.owner_id, user.id,
                "place {} is in user {}'s set but owned by {}",
                place_id, user.id, place.owner_id
            );
        }
    }

    for place in &places {
        let owner = users
            .iter()
            .find(|u| u.id == place.owner_id)
            .unwrap_or_else(|| panic!("place {} has dangling owner {}", place.id, place.owner_id));
        assert!(
            owner.place_ids().unwrap().contains(&place.id),
            "place {} missing from owner {}'s set",
            place.id,
            owner.id
        );
    }
}
