//! # Authentication Handlers
//!
//! HTTP request handlers for user authentication endpoints.
//!
//! ## Overview
//!
//! This module implements the authentication flow including:
//! - User signup with email/password (only while registrations are enabled)
//! - User login with email or username
//! - JWT token generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::post};
//! use lib_web::handlers::auth::{signup, login};
//!
//! let app = Router::new()
//!     .route("/api/auth/signup", post(signup))
//!     .route("/api/auth/login", post(login));
//! ```

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use lib_auth::{encode_jwt, hash_password, verify_password};
use lib_core::dto::{ApiResponse, AuthResponse, LoginRequest, SignupRequest, UserInfo};
use lib_core::model::store::models::User;
use lib_core::model::store::{SettingsRepository, UserRepository};
use lib_core::{AppError, Config, DbPool, Result};
use tracing::{debug, info, instrument, warn};

/// Signup handler - creates a new user account.
///
/// # Returns
///
/// * `201 Created` with the new user and a JWT
/// * `400` on validation failure, `403` when registrations are disabled,
///   `409` when the email or username is taken
///
/// # Validation
///
/// - Username must be at least 3 characters
/// - Email must look like an address and be unique
/// - Username must be unique
/// - Password must be at least 8 characters (validated in hash_password)
#[instrument(skip(pool, config, req), fields(username = %req.username, email = %req.email))]
pub async fn signup(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    info!("[SIGNUP] New user signup request");

    let settings = SettingsRepository::get(&pool).await?;
    if !settings.allow_registrations {
        warn!("[SIGNUP] Registrations are disabled");
        return Err(AppError::Forbidden("Registrations are currently disabled".to_string()));
    }

    let username = req.username.trim();
    let email = req.email.trim();

    lib_utils::validate_min_length(username, 3, "Username").map_err(AppError::InvalidInput)?;
    lib_utils::validate_email(email).map_err(AppError::InvalidInput)?;

    if UserRepository::find_by_email(&pool, email).await?.is_some() {
        warn!("[SIGNUP] Email already registered");
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if UserRepository::find_by_username(&pool, username).await?.is_some() {
        warn!("[SIGNUP] Username already taken");
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    debug!("[SIGNUP] Hashing password...");
    let password_hash = hash_password(&req.password)?;

    debug!("[SIGNUP] Creating user in database...");
    let user = UserRepository::create(&pool, username, email, &password_hash).await?;

    let response = auth_response(&user, &config)?;

    info!(user_id = user.id, "[SIGNUP] User created and authenticated");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Signup successful", response)),
    ))
}

/// Login handler - authenticates existing user.
///
/// - Accepts either email (contains '@') or username
/// - Verifies password using Argon2
/// - Rejects deactivated accounts with `403`
/// - Updates the last_login timestamp
#[instrument(skip(pool, config, req), fields(identifier = %req.email_or_username))]
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    info!("[LOGIN] Login attempt");

    let identifier = req.email_or_username.trim();
    let user = if identifier.contains('@') {
        UserRepository::find_by_email(&pool, identifier).await?
    } else {
        UserRepository::find_by_username(&pool, identifier).await?
    };

    let Some(user) = user else {
        warn!("[LOGIN] Unknown identifier");
        return Err(invalid_credentials());
    };

    if !user.is_active {
        warn!("[LOGIN] Account deactivated: {}", user.username);
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    debug!("[LOGIN] Verifying password...");
    if !verify_password(&req.password, &user.password_hash)? {
        warn!("[LOGIN] Invalid password for user: {}", user.username);
        return Err(invalid_credentials());
    }

    UserRepository::update_last_login(&pool, user.id).await?;

    let response = auth_response(&user, &config)?;

    info!(user_id = user.id, "[LOGIN] User authenticated successfully");
    Ok(Json(ApiResponse::success("Login successful", response)))
}

fn auth_response(user: &User, config: &Config) -> Result<AuthResponse> {
    let token = encode_jwt(
        user.id,
        user.username.clone(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;

    Ok(AuthResponse {
        user: UserInfo::from(user),
        token,
    })
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

#[cfg(test)]
mod tests;
