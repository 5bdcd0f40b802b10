//! Shared fixtures for service and handler tests.

use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::model::store::models::{User, UserRole};
use lib_core::model::store::UserRepository;
use lib_core::{create_memory_pool, Config, DbPool};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "TestPassword123!";

pub async fn setup_test_db() -> DbPool {
    create_memory_pool()
        .await
        .expect("Failed to create test database")
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        jwt_expiration_hours: 24,
    }
}

/// User that can only authenticate through [`token_for`].
pub async fn create_user(pool: &DbPool, username: &str) -> User {
    UserRepository::create(pool, username, &format!("{username}@example.com"), "hash")
        .await
        .expect("Failed to create test user")
}

/// User whose password is [`TEST_PASSWORD`], for login tests.
pub async fn create_user_with_password(pool: &DbPool, username: &str) -> User {
    let hash = lib_auth::hash_password(TEST_PASSWORD).expect("Failed to hash test password");
    UserRepository::create(pool, username, &format!("{username}@example.com"), &hash)
        .await
        .expect("Failed to create test user")
}

pub async fn create_admin(pool: &DbPool, username: &str) -> User {
    let mut user = create_user(pool, username).await;
    UserRepository::set_role_by_email(pool, &user.email, UserRole::Admin)
        .await
        .expect("Failed to promote test user");
    user.role = UserRole::Admin;
    user
}

pub fn token_for(user: &User) -> String {
    let config = test_config();
    lib_auth::encode_jwt(user.id, user.username.clone(), &config.jwt_secret, 1)
        .expect("Failed to encode test token")
}

pub fn test_app(pool: DbPool) -> Router {
    create_router(
        AppState {
            db: pool,
            config: test_config(),
        },
        &[],
    )
}

/// Send one request through the full router and decode the JSON envelope.
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
