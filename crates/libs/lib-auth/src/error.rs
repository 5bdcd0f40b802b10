//! # Auth Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Password rejected before hashing (too short).
    #[error("{0}")]
    WeakPassword(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Failed to encode JWT: {0}")]
    TokenEncode(String),

    /// Expired, badly signed or malformed token.
    #[error("Failed to decode JWT: {0}")]
    TokenDecode(String),

    /// The `sub` claim is not a numeric user id.
    #[error("Invalid subject claim: {0}")]
    InvalidSubject(String),
}
