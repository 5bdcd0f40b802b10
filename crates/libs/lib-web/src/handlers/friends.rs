//! # Friend Management Handlers
//!
//! HTTP endpoints for friend requests and friend management. The path names
//! the other user; the caller is taken from the token.
//!
//! ## Endpoints
//!
//! - `GET /api/friends` - Friends plus sent and received requests
//! - `POST /api/friends/{user_id}/send-request`
//! - `POST /api/friends/{user_id}/cancel-request` - Withdraw a request the caller sent
//! - `POST /api/friends/{user_id}/accept-request` - Accept a request from `user_id`
//! - `POST /api/friends/{user_id}/reject-request` - Decline a request from `user_id`
//! - `POST /api/friends/{user_id}/unfriend`

use crate::services::FriendService;
use axum::extract::{Extension, Json, Path, State};
use lib_auth::Claims;
use lib_core::dto::{ApiResponse, FriendActionResponse, FriendsListResponse};
use lib_core::{DbPool, Result};
use tracing::instrument;

type ActionResult = Result<Json<ApiResponse<FriendActionResponse>>>;

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn get_friends(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<FriendsListResponse>>> {
    let lists = FriendService::new(db).list(claims.user_id()?).await?;

    Ok(Json(ApiResponse::success("Friends retrieved", lists)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn send_request(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(other_id): Path<i64>,
) -> ActionResult {
    let outcome = FriendService::new(db).send_request(claims.user_id()?, other_id).await?;
    Ok(Json(ApiResponse::success("Friend request sent", outcome)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn cancel_request(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(other_id): Path<i64>,
) -> ActionResult {
    let outcome = FriendService::new(db).cancel_request(claims.user_id()?, other_id).await?;
    Ok(Json(ApiResponse::success("Friend request cancelled", outcome)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn accept_request(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(other_id): Path<i64>,
) -> ActionResult {
    let outcome = FriendService::new(db).accept_request(claims.user_id()?, other_id).await?;
    Ok(Json(ApiResponse::success("Friend request accepted", outcome)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn reject_request(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(other_id): Path<i64>,
) -> ActionResult {
    let outcome = FriendService::new(db).reject_request(claims.user_id()?, other_id).await?;
    Ok(Json(ApiResponse::success("Friend request rejected", outcome)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn unfriend(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(other_id): Path<i64>,
) -> ActionResult {
    let outcome = FriendService::new(db).unfriend(claims.user_id()?, other_id).await?;
    Ok(Json(ApiResponse::success("Friend removed", outcome)))
}
