//! # HTTP Request Handlers
//!
//! This module contains all Axum HTTP request handlers organized by feature domain.
//!
//! Each handler module follows the **single responsibility principle**, handling
//! all HTTP endpoints for a specific feature area. Handlers delegate business logic
//! to services in the [`crate::services`] module.
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: User authentication endpoints (signup, login)
//!   - `POST /api/auth/signup` - Create new user account
//!   - `POST /api/auth/login` - Authenticate with email or username
//!
//! - **[`users`]**: The caller's account and user search
//!
//! - **[`conversations`]**: Private and group conversations
//!
//! - **[`messages`]**: Messages nested under `/api/conversations/{id}/messages`
//!
//! - **[`notifications`]**: The caller's notification inbox
//!
//! - **[`friends`]**: Friend requests and the friend list
//!
//! - **[`settings`]**: The persisted admin settings
//!
//! ## Handler Architecture
//!
//! All handlers follow Axum's extractor pattern:
//!
//! ```rust,ignore
//! async fn handler(
//!     State(db): State<DbPool>,              // Shared state
//!     Extension(claims): Extension<Claims>,  // JWT auth
//!     Json(payload): Json<RequestBody>,      // Request body
//! ) -> Result<Json<ApiResponse<Data>>, AppError> {
//!     let data = SomeService::new(db).operation(claims.user_id()?, payload).await?;
//!     Ok(Json(ApiResponse::success("Done", data)))
//! }
//! ```
//!
//! ## Authentication
//!
//! Protected endpoints use `Extension<Claims>` to extract JWT claims.
//! The auth middleware validates tokens before handlers execute.
//!
//! Public endpoints (signup, login, health check) don't require auth.
//!
//! ## Error Handling
//!
//! Handlers return `lib_core::Result<T>`. Every `AppError` renders as the
//! failure envelope `{ "success": false, "message": "...", "data": null }`
//! with the matching status code, so handlers simply propagate with `?`.
//!
//! ## Request/Response Flow
//!
//! ```text
//! Client Request
//!     ↓
//! CORS Middleware (tower-http)
//!     ↓
//! Request stamp, trace span, request logging
//!     ↓
//! Auth Middleware (JWT validation, protected routes only)
//!     ↓
//! Handler (business logic)
//!     ↓
//! Response (JSON serialization)
//!     ↓
//! Client Response
//! ```
//!
//! ## Testing Handlers
//!
//! Handler tests build the full router over an in-memory database and drive it
//! with `tower::ServiceExt::oneshot` (see `crate::test_support::call`).

pub mod auth;
pub mod conversations;
pub mod friends;
pub mod messages;
pub mod notifications;
pub mod settings;
pub mod users;
