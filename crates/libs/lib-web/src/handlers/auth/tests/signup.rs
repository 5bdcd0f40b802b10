//! # Signup Tests
//!
//! Tests for user signup functionality.

use super::*;
use lib_core::model::store::models::{SettingsForUpdate, UserRole};

#[tokio::test]
async fn test_signup_success() {
    // Arrange
    let app = test_app(setup_test_db().await);

    // Act
    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("testuser", "test@example.com", TEST_PASSWORD),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Signup successful");

    let auth = auth_data(&body);
    assert_eq!(auth.user.username, "testuser");
    assert_eq!(auth.user.email, "test@example.com");
    assert_eq!(auth.user.role, UserRole::User);
    assert!(!auth.token.is_empty());
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_username_too_short() {
    let app = test_app(setup_test_db().await);

    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("ab", "test@example.com", TEST_PASSWORD),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Username must be at least 3 characters");
}

#[tokio::test]
async fn test_signup_invalid_email() {
    let app = test_app(setup_test_db().await);

    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("testuser", "invalid-email", TEST_PASSWORD),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    // Arrange
    let pool = setup_test_db().await;
    create_user_with_password(&pool, "existing").await;
    let app = test_app(pool);

    // Act
    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("newuser", "existing@example.com", TEST_PASSWORD),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let pool = setup_test_db().await;
    create_user_with_password(&pool, "existing").await;
    let app = test_app(pool);

    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("existing", "other@example.com", TEST_PASSWORD),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already taken");
}

#[tokio::test]
async fn test_signup_password_too_short() {
    let app = test_app(setup_test_db().await);

    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("testuser", "test@example.com", "short"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn test_signup_refused_when_registrations_disabled() {
    // Arrange
    let pool = setup_test_db().await;
    SettingsRepository::update(
        &pool,
        &SettingsForUpdate {
            allow_registrations: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let app = test_app(pool.clone());

    // Act
    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("testuser", "test@example.com", TEST_PASSWORD),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Registrations are currently disabled");
    assert!(UserRepository::find_by_username(&pool, "testuser").await.unwrap().is_none());
}
