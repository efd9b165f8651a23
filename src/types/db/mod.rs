// Database entities - SeaORM models
pub mod place;
pub mod user;
