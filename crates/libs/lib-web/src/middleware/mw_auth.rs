//! # Authentication Middleware
//!
//! Axum middleware for JWT token validation and user authentication.
//!
//! This middleware extracts and validates JWT tokens from the `Authorization` header,
//! then injects the authenticated user's claims into the request extensions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{Router, routing::get, middleware::from_fn_with_state};
//! use lib_web::middleware::mw_auth::require_auth;
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .route_layer(from_fn_with_state(state.clone(), require_auth))
//!     .with_state(state);
//! ```
//!
//! Handlers can then extract claims using `Extension<Claims>`:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use lib_auth::Claims;
//!
//! async fn protected_handler(Extension(claims): Extension<Claims>) -> String {
//!     format!("Hello, user {}!", claims.username)
//! }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::decode_jwt;
use lib_core::{AppError, Config};
use tracing::{debug, warn};

/// Authentication middleware that validates JWT tokens.
///
/// # Behavior
///
/// - **Valid token**: Continues to next middleware/handler with `Claims` in extensions
/// - **Missing/invalid token**: Returns `401 Unauthorized` in the error envelope
pub async fn require_auth(
    State(config): State<Config>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            AppError::Unauthorized("Authentication required".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("[AUTH] Invalid Authorization header format");
        AppError::Unauthorized("Invalid authorization header".to_string())
    })?;

    let claims = decode_jwt(token, &config.jwt_secret).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        AppError::from(e)
    })?;
    // Reject tokens whose subject is not a user id before any handler sees them
    claims.user_id()?;

    debug!("[AUTH] Authenticated user: {} (id: {})", claims.username, claims.sub);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
