//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the account endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/auth/signup` - [`SignupRequest`] -> [`AuthResponse`]
//! - `POST /api/auth/login` - [`LoginRequest`] -> [`AuthResponse`]
//! - `GET /api/users/me` -> [`UserInfo`]
//! - `GET /api/users/search?query=` - [`UserSearchQuery`] -> `Vec<UserSearchResult>`
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names in JSON (default serde behavior) and
//! travel inside the [`ApiResponse`](super::ApiResponse) envelope:
//!
//! ```text
//! POST /api/auth/login
//! Content-Type: application/json
//!
//! {
//!   "email_or_username": "alice",
//!   "password": "MyPassword123!"
//! }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "success": true,
//!   "message": "Login successful",
//!   "data": {
//!     "user": {
//!       "id": 1,
//!       "username": "alice",
//!       "email": "alice@example.com",
//!       "role": "user",
//!       "created_at": "2024-01-01T00:00:00Z"
//!     },
//!     "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..."
//!   }
//! }
//! ```

use crate::model::store::models::{FriendState, User, UserRole, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login request with email or username.
///
/// An identifier containing `@` is looked up as an email, anything else as a username.
///
/// # Security Note
///
/// Password is sent in plaintext over HTTPS and only ever compared against the Argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// Signup request for new user registration.
///
/// # Validation Rules (Server-Side)
///
/// - Username must be at least 3 characters
/// - Email must be a valid format and not already registered
/// - Password must be at least 8 characters
/// - Registrations must be enabled in the app settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Returned on successful login or signup.
///
/// The `token` should be included in subsequent API requests as:
/// ```text
/// Authorization: Bearer <token>
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

/// User information (public, safe to send to the owner).
///
/// Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Query string of `GET /api/users/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSearchQuery {
    pub query: String,
}

/// A search hit with the caller's relationship to that user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSearchResult {
    pub id: i64,
    pub username: String,
    pub friend_state: FriendState,
}

impl UserSearchResult {
    pub fn new(user: UserSummary, friend_state: FriendState) -> Self {
        Self {
            id: user.id,
            username: user.username,
            friend_state,
        }
    }
}
