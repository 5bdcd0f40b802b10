//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across repositories, services and handlers. It follows the `thiserror` pattern.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx)
//!    - [`InvalidInput`](AppError::InvalidInput) → 400 Bad Request
//!    - [`Unauthorized`](AppError::Unauthorized) → 401 Unauthorized
//!    - [`Forbidden`](AppError::Forbidden) → 403 Forbidden
//!    - [`NotFound`](AppError::NotFound) → 404 Not Found
//!    - [`Conflict`](AppError::Conflict) → 409 Conflict
//!
//! 2. **Server Errors** (5xx)
//!    - [`Config`](AppError::Config) → 500 Internal Server Error
//!    - [`Internal`](AppError::Internal) → 500 Internal Server Error
//!
//! Every error renders as the API envelope
//! `{ "success": false, "message": "...", "data": null }` with the status code above.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn parse_content(content: &str) -> Result<&str> {
//!     if content.trim().is_empty() {
//!         return Err(AppError::InvalidInput("Message content is required".to_string()));
//!     }
//!     Ok(content)
//! }
//! ```
//!
//! ## Error Conversion
//!
//! - `From<anyhow::Error>` → `Internal`
//! - `From<sqlx::Error>` → `NotFound` for `RowNotFound`, otherwise `Internal`
//! - `From<serde_json::Error>` → `Internal` (stored JSON columns are server data)
//! - `From<lib_auth::Error>` → `InvalidInput` / `Unauthorized` / `Internal`

use crate::dto::ApiResponse;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input validation error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request contradicts the current state (duplicate friend request, taken username).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Config(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = Json(ApiResponse::<()>::failure(self.user_message()));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<lib_auth::Error> for AppError {
    fn from(err: lib_auth::Error) -> Self {
        match err {
            lib_auth::Error::WeakPassword(msg) => AppError::InvalidInput(msg),
            lib_auth::Error::TokenDecode(_) | lib_auth::Error::InvalidSubject(_) => {
                AppError::Unauthorized("Invalid or expired token".to_string())
            }
            lib_auth::Error::Hash(_) | lib_auth::Error::TokenEncode(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("Database error: disk I/O".into());
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(AppError::Conflict("Request already sent.".into()).user_message(), "Request already sent.");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
    }

    #[test]
    fn test_auth_errors_map() {
        let weak = AppError::from(lib_auth::Error::WeakPassword("too short".into()));
        assert!(matches!(weak, AppError::InvalidInput(m) if m == "too short"));

        let bad = AppError::from(lib_auth::Error::TokenDecode("ExpiredSignature".into()));
        assert_eq!(bad.status_code(), StatusCode::UNAUTHORIZED);
    }
}
