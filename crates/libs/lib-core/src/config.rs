//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The config is built once in the server entry point and handed to handlers
//! through axum state (`State<Config>`); there is no global instance.
//!
//! Runtime-tunable settings (site name, registrations, message length) are not
//! part of this struct: they live in the persisted `app_settings` record, see
//! [`crate::model::store::SettingsRepository`].

use lib_utils::{get_env, get_env_or, get_env_parse_or};

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/mosaic.db";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours
    ///
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub jwt_expiration_hours: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `DATABASE_URL` (default [`DEFAULT_DATABASE_URL`])
    /// - `JWT_SECRET` (required)
    /// - `JWT_EXPIRATION_HOURS` (default 24)
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", DEFAULT_DATABASE_URL);

        let jwt_secret = get_env("JWT_SECRET").map_err(|e| e.to_string())?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 24)
            .map_err(|e| format!("JWT_EXPIRATION_HOURS must be a valid number: {}", e))?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        Ok(())
    }
}
