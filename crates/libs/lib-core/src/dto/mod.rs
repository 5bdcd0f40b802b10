//! # Data Transfer Objects (DTOs)
//!
//! Request and response bodies of the REST API. Every response is wrapped in
//! [`ApiResponse`].

pub mod auth;
pub mod envelope;
pub mod friends;
pub mod messaging;
pub mod notifications;

pub use auth::*;
pub use envelope::ApiResponse;
pub use friends::*;
pub use messaging::*;
pub use notifications::*;
