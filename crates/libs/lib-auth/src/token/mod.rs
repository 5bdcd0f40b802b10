//! # JWT Token Management
//!
//! JWT token generation and validation. Tokens are HS256-signed and carry the
//! numeric user id as `sub`.

use crate::error::{Error, Result};
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims structure containing user authentication information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Numeric id of the authenticated user.
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| Error::InvalidSubject(self.sub.clone()))
    }
}

/// Encode a JWT token with user claims.
pub fn encode_jwt(
    user_id: i64,
    username: String,
    secret: &str,
    expiration_hours: i64,
) -> Result<String> {
    let now = lib_utils::now_utc();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        username,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::TokenEncode(e.to_string()))
}

/// Decode and validate a JWT token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| Error::TokenDecode(e.to_string()))?;

    Ok(token_data.claims)
}
