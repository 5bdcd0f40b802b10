//! # Services Layer
//!
//! Business logic between the HTTP handlers and the repositories:
//!
//! ```text
//! Handlers (HTTP) → Services (Business Logic) → Repositories (sqlx)
//! ```
//!
//! ## Module Organization
//!
//! - [`conversations`] - Creating, listing and muting conversations
//! - [`messaging`] - Sending, reading, editing and deleting messages
//! - [`notifications`] - Notification inbox operations
//! - [`friends`] - Friend request workflow
//! - [`settings`] - The persisted admin settings record
//!
//! ## Service Pattern
//!
//! Services are structs holding their dependencies (the `DbPool`) and exposing
//! async methods for business operations:
//!
//! ```rust,no_run
//! use lib_web::services::FriendService;
//! # async fn example(pool: lib_core::DbPool) -> lib_core::Result<()> {
//! let service = FriendService::new(pool);
//! let outcome = service.send_request(1, 2).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All services return `Result<T, AppError>`. Every operation that writes more
//! than one record runs inside a single sqlx transaction, so an error leaves
//! the database untouched.

pub mod conversations;
pub mod friends;
pub mod messaging;
pub mod notifications;
pub mod settings;

// Re-export services for convenience
pub use conversations::ConversationService;
pub use friends::FriendService;
pub use messaging::MessagingService;
pub use notifications::NotificationService;
pub use settings::SettingsService;
