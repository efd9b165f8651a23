use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use poem::http::{Method, StatusCode};
use poem::{listener::TcpListener, middleware::Cors, EndpointExt, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};

use places_backend::api::{PlacesApi, UsersApi};
use places_backend::config::{logging::init_logging, AppConfig};
use places_backend::coordinators::PlaceCoordinator;
use places_backend::services::{AuthGate, TokenService};
use places_backend::stores::{ImageStore, PlaceStore, UserStore};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = AppConfig::from_env().expect("JWT_SECRET environment variable must be set");

    // Connect to database
    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    println!("Connected to database: {}", config.database_url);

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    println!("Database migrations completed");

    // Shared services and stores
    let token_service = Arc::new(TokenService::new(config.jwt_secret.clone()));
    let auth_gate = Arc::new(AuthGate::new(token_service.clone()));
    let user_store = Arc::new(UserStore::new(db.clone()));
    let place_store = Arc::new(PlaceStore::new(db.clone()));
    let image_store = Arc::new(ImageStore::new(&config.upload_dir));

    // Coordinator for mutations spanning both collections
    let coordinator = Arc::new(PlaceCoordinator::new(
        db.clone(),
        place_store.clone(),
        user_store.clone(),
        image_store.clone(),
    ));

    let places_api = PlacesApi::new(place_store, image_store.clone(), coordinator, auth_gate);
    let users_api = UsersApi::new(user_store, image_store, token_service);

    // Create OpenAPI service with both resource APIs
    let api_service = OpenApiService::new((places_api, users_api), "Places API", "1.0.0")
        .server(format!("http://{}/api", config.bind_addr));

    // Generate Swagger UI from OpenAPI service
    let ui = api_service.swagger_ui();

    // Cross-origin requests are universally permitted with a fixed set of
    // headers and methods; the middleware also answers preflight requests
    // before they reach any handler
    let cors = Cors::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            "Origin",
            "X-Requested-With",
            "Content-Type",
            "Accept",
            "Authorization",
        ]);

    // Compose routes: API under /api, Swagger UI under /swagger, and a JSON
    // 404 for anything unmatched
    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .catch_error(|_: poem::error::NotFoundError| async move {
            poem::Response::builder()
                .status(StatusCode::NOT_FOUND)
                .content_type("application/json")
                .body(r#"{"message":"Could not find this route."}"#)
        })
        .with(cors);

    println!("Starting server on http://{}", config.bind_addr);
    println!("Swagger UI available at http://{}/swagger", config.bind_addr);

    Server::new(TcpListener::bind(config.bind_addr.clone()))
        .run(app)
        .await
}
