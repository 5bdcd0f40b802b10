//! # Conversation Handlers
//!
//! - `GET /api/conversations` - The caller's conversations, most recent first
//! - `POST /api/conversations` - Create a group, or get-or-create a private conversation
//! - `GET /api/conversations/{id}` - One conversation (participants only)
//! - `PUT /api/conversations/{id}/mute` - Toggle notifications for the caller

use crate::services::ConversationService;
use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use lib_auth::Claims;
use lib_core::dto::{ApiResponse, ConversationSummary, CreateConversationRequest, MuteRequest};
use lib_core::model::store::models::Conversation;
use lib_core::{DbPool, Result};
use tracing::instrument;

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn list_conversations(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<ConversationSummary>>>> {
    let conversations = ConversationService::new(db).list(claims.user_id()?).await?;

    Ok(Json(ApiResponse::success("Conversations retrieved", conversations)))
}

/// `201 Created` for a new conversation, `200 OK` when an existing private
/// conversation is returned.
#[instrument(skip(db, claims, req), fields(user_id = %claims.sub))]
pub async fn create_conversation(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Conversation>>)> {
    let (conversation, created) = ConversationService::new(db)
        .create(claims.user_id()?, req)
        .await?;

    if created {
        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success("Conversation created", conversation)),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(ApiResponse::success("Conversation already exists", conversation)),
        ))
    }
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn get_conversation(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Conversation>>> {
    let conversation = ConversationService::new(db).get(id, claims.user_id()?).await?;

    Ok(Json(ApiResponse::success("Conversation retrieved", conversation)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn mute_conversation(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<MuteRequest>,
) -> Result<Json<ApiResponse<Conversation>>> {
    let conversation = ConversationService::new(db)
        .set_muted(id, claims.user_id()?, req.muted)
        .await?;

    let message = if req.muted { "Conversation muted" } else { "Conversation unmuted" };
    Ok(Json(ApiResponse::success(message, conversation)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, create_user, setup_test_db, test_app, token_for};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_private_conversation_is_created_once() {
        let pool = setup_test_db().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let app = test_app(pool);

        let body = json!({ "conversation_type": "private", "participant_ids": [bob.id] });

        let (status, first) = call(&app, "POST", "/api/conversations", Some(&token_for(&alice)), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["data"]["participants"].as_array().unwrap().len(), 2);

        // Bob asking for the same pair gets the existing conversation
        let reverse = json!({ "conversation_type": "private", "participant_ids": [alice.id] });
        let (status, second) = call(&app, "POST", "/api/conversations", Some(&token_for(&bob)), Some(reverse)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["id"], first["data"]["id"]);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let pool = setup_test_db().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let app = test_app(pool);
        let token = token_for(&alice);

        let no_name = json!({ "conversation_type": "group", "participant_ids": [bob.id] });
        let (status, body) = call(&app, "POST", "/api/conversations", Some(&token), Some(no_name)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Group name is required");

        let unknown = json!({ "conversation_type": "private", "participant_ids": [4242] });
        let (status, _) = call(&app, "POST", "/api/conversations", Some(&token), Some(unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_outsider_is_forbidden_and_mute_is_per_user() {
        let pool = setup_test_db().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let carol = create_user(&pool, "carol").await;
        let app = test_app(pool);

        let group = json!({
            "conversation_type": "group",
            "participant_ids": [bob.id],
            "name": "Weekend"
        });
        let (_, created) = call(&app, "POST", "/api/conversations", Some(&token_for(&alice)), Some(group)).await;
        let id = created["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/conversations/{id}");

        let (status, body) = call(&app, "GET", &uri, Some(&token_for(&carol)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let (status, body) = call(
            &app,
            "PUT",
            &format!("{uri}/mute"),
            Some(&token_for(&bob)),
            Some(json!({ "muted": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let muted: Vec<(i64, bool)> = body["data"]["participants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| (p["user_id"].as_i64().unwrap(), p["muted"].as_bool().unwrap()))
            .collect();
        assert!(muted.contains(&(bob.id, true)));
        assert!(muted.contains(&(alice.id, false)));

        let (status, listed) = call(&app, "GET", "/api/conversations", Some(&token_for(&bob)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"][0]["id"], id);
        assert_eq!(listed["data"][0]["unread_count"], 0);
    }
}
