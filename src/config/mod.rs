pub mod logging;

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub upload_dir: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// `JWT_SECRET` is required; everything else carries a development
    /// default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://places.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let upload_dir =
            env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads/images".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            upload_dir,
        })
    }
}
