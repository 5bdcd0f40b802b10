//! # Message Handlers
//!
//! Messages are addressed through their conversation; a message id that
//! belongs to another conversation is reported as not found.
//!
//! - `POST /api/conversations/{id}/messages` - Send a message
//! - `GET /api/conversations/{id}/messages` - List visible messages and mark them read
//! - `GET /api/conversations/{id}/messages/{message_id}` - One message, deleted ones included
//! - `PUT /api/conversations/{id}/messages/{message_id}` - Edit (sender only)
//! - `DELETE /api/conversations/{id}/messages/{message_id}` - Soft delete (sender only)
//! - `PUT /api/conversations/{id}/messages/{message_id}/read` - Read receipt

use crate::services::MessagingService;
use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use lib_auth::Claims;
use lib_core::dto::{ApiResponse, EditMessageRequest, SendMessageRequest};
use lib_core::model::store::models::Message;
use lib_core::{DbPool, Result};
use tracing::instrument;

#[instrument(skip(db, claims, req), fields(user_id = %claims.sub))]
pub async fn send_message(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>)> {
    let message = MessagingService::new(db)
        .send_message(conversation_id, claims.user_id()?, req)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Message sent", message))))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn list_messages(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Message>>>> {
    let messages = MessagingService::new(db)
        .get_messages(conversation_id, claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success("Messages retrieved", messages)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn get_message(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<Message>>> {
    let message = MessagingService::new(db)
        .get_message(conversation_id, message_id, claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success("Message retrieved", message)))
}

#[instrument(skip(db, claims, req), fields(user_id = %claims.sub))]
pub async fn edit_message(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
    Json(req): Json<EditMessageRequest>,
) -> Result<Json<ApiResponse<Message>>> {
    let message = MessagingService::new(db)
        .edit_message(conversation_id, message_id, claims.user_id()?, &req.content)
        .await?;

    Ok(Json(ApiResponse::success("Message updated", message)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn delete_message(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>> {
    MessagingService::new(db)
        .delete_message(conversation_id, message_id, claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success("Message deleted", ())))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn mark_message_read(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<Message>>> {
    let message = MessagingService::new(db)
        .mark_as_read(conversation_id, message_id, claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success("Message marked as read", message)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, create_user, setup_test_db, test_app, token_for};
    use axum::http::StatusCode;
    use axum::Router;
    use lib_core::model::store::models::User;
    use serde_json::{json, Value};

    struct Chat {
        app: Router,
        alice: User,
        bob: User,
        uri: String,
    }

    async fn private_chat() -> Chat {
        let pool = setup_test_db().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let app = test_app(pool);

        let body = json!({ "conversation_type": "private", "participant_ids": [bob.id] });
        let (_, created) = call(&app, "POST", "/api/conversations", Some(&token_for(&alice)), Some(body)).await;
        let id = created["data"]["id"].as_i64().unwrap();

        Chat {
            app,
            alice,
            bob,
            uri: format!("/api/conversations/{id}/messages"),
        }
    }

    async fn send(chat: &Chat, from: &User, content: &str) -> Value {
        let (status, body) = call(
            &chat.app,
            "POST",
            &chat.uri,
            Some(&token_for(from)),
            Some(json!({ "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_send_then_list_clears_unread() {
        let chat = private_chat().await;
        let bob_token = token_for(&chat.bob);

        let sent = send(&chat, &chat.alice, "  hello bob ").await;
        assert_eq!(sent["content"], "hello bob");
        assert_eq!(sent["read_by"], json!([chat.alice.id]));

        let (_, listed) = call(&chat.app, "GET", "/api/conversations", Some(&bob_token), None).await;
        assert_eq!(listed["data"][0]["unread_count"], 1);
        assert_eq!(listed["data"][0]["last_message"]["content"], "hello bob");

        let (status, messages) = call(&chat.app, "GET", &chat.uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(messages["data"][0]["read_by"], json!([chat.alice.id, chat.bob.id]));

        let (_, listed) = call(&chat.app, "GET", "/api/conversations", Some(&bob_token), None).await;
        assert_eq!(listed["data"][0]["unread_count"], 0);

        let (_, notes) = call(&chat.app, "GET", "/api/notifications", Some(&bob_token), None).await;
        assert_eq!(notes["data"][0]["kind"]["type"], "message");
        assert_eq!(notes["data"][0]["message"], "hello bob");
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let chat = private_chat().await;

        let (status, body) = call(
            &chat.app,
            "POST",
            &chat.uri,
            Some(&token_for(&chat.alice)),
            Some(json!({ "content": "   " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Message content is required");
    }

    #[tokio::test]
    async fn test_edit_and_delete_are_sender_only() {
        let chat = private_chat().await;
        let sent = send(&chat, &chat.alice, "first draft").await;
        let message_uri = format!("{}/{}", chat.uri, sent["id"]);

        let (status, _) = call(
            &chat.app,
            "PUT",
            &message_uri,
            Some(&token_for(&chat.bob)),
            Some(json!({ "content": "hijacked" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, edited) = call(
            &chat.app,
            "PUT",
            &message_uri,
            Some(&token_for(&chat.alice)),
            Some(json!({ "content": "final" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["data"]["content"], "final");
        assert_eq!(edited["data"]["is_edited"], true);

        let (status, _) = call(&chat.app, "DELETE", &message_uri, Some(&token_for(&chat.bob)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&chat.app, "DELETE", &message_uri, Some(&token_for(&chat.alice)), None).await;
        assert_eq!(status, StatusCode::OK);

        // Hidden from the list, still reachable directly
        let (_, listed) = call(&chat.app, "GET", &chat.uri, Some(&token_for(&chat.bob)), None).await;
        assert!(listed["data"].as_array().unwrap().is_empty());

        let (status, fetched) = call(&chat.app, "GET", &message_uri, Some(&token_for(&chat.bob)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["is_deleted"], true);
    }

    #[tokio::test]
    async fn test_mark_read_twice_decrements_once() {
        let chat = private_chat().await;
        let bob_token = token_for(&chat.bob);
        let first = send(&chat, &chat.alice, "one").await;
        send(&chat, &chat.alice, "two").await;

        let read_uri = format!("{}/{}/read", chat.uri, first["id"]);
        for _ in 0..2 {
            let (status, body) = call(&chat.app, "PUT", &read_uri, Some(&bob_token), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["read_by"], json!([chat.alice.id, chat.bob.id]));
        }

        let (_, listed) = call(&chat.app, "GET", "/api/conversations", Some(&bob_token), None).await;
        assert_eq!(listed["data"][0]["unread_count"], 1);
    }

    #[tokio::test]
    async fn test_message_from_other_conversation_is_not_found() {
        let chat = private_chat().await;
        let sent = send(&chat, &chat.alice, "hi").await;

        let (status, _) = call(
            &chat.app,
            "GET",
            &format!("/api/conversations/4242/messages/{}", sent["id"]),
            Some(&token_for(&chat.alice)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
