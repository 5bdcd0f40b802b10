//! # Integration Tests
//!
//! Edge cases and integration tests for the authentication flow.

use super::*;

#[tokio::test]
async fn test_signup_then_login_then_me() {
    // Arrange
    let app = test_app(setup_test_db().await);

    let (status, _) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("testuser", "test@example.com", TEST_PASSWORD),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Act
    let (status, body) = post_auth(
        &app,
        "/api/auth/login",
        json!({ "email_or_username": "test@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = auth_data(&body).token;

    let (status, me) = call(&app, "GET", "/api/users/me", Some(&token), None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], "testuser");
}

#[tokio::test]
async fn test_signup_with_special_characters() {
    let app = test_app(setup_test_db().await);

    let (status, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("user_test-123", "user+tag@example.com", "P@ssw0rd!#$%"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let auth = auth_data(&body);
    assert_eq!(auth.user.username, "user_test-123");
    assert_eq!(auth.user.email, "user+tag@example.com");
}

#[tokio::test]
async fn test_jwt_token_is_valid() {
    // Arrange
    let app = test_app(setup_test_db().await);
    let config = test_config();

    // Act
    let (_, body) = post_auth(
        &app,
        "/api/auth/signup",
        signup_body("testuser", "test@example.com", TEST_PASSWORD),
    )
    .await;
    let auth = auth_data(&body);

    // Decode the JWT token and verify it's valid
    let claims = lib_auth::decode_jwt(&auth.token, &config.jwt_secret)
        .expect("JWT decoding should succeed for valid token");

    // Assert
    assert_eq!(claims.username, "testuser");
    assert_eq!(claims.user_id().unwrap(), auth.user.id);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = test_app(setup_test_db().await);

    let (status, _) = post_auth(&app, "/api/auth/login", json!({ "password": TEST_PASSWORD })).await;

    assert!(status.is_client_error());
}
