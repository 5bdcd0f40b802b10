//! # Auth Handler Tests
//!
//! Test suite for authentication handlers (signup and login), driven through
//! the full router.

mod signup;
mod integration;

use super::*;
use crate::test_support::{
    call, create_user_with_password, setup_test_db, test_app, test_config, TEST_PASSWORD,
};
use axum::http::StatusCode;
use serde_json::{json, Value};

/// POST a JSON body to an auth endpoint.
pub async fn post_auth(app: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    call(app, "POST", path, None, Some(body)).await
}

pub fn signup_body(username: &str, email: &str, password: &str) -> Value {
    json!({ "username": username, "email": email, "password": password })
}

/// Decode the `data` field of a successful auth envelope.
pub fn auth_data(body: &Value) -> AuthResponse {
    serde_json::from_value(body["data"].clone()).expect("Envelope should carry an AuthResponse")
}
