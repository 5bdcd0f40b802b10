//! # User Handlers
//!
//! - `GET /api/users/me` - The authenticated account
//! - `GET /api/users/search?query={username}` - Find users to message or befriend

use axum::extract::{Extension, Json, Query, State};
use lib_auth::Claims;
use lib_core::dto::{ApiResponse, UserInfo, UserSearchQuery, UserSearchResult};
use lib_core::model::store::{FriendRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use tracing::instrument;

/// Maximum number of search results.
const SEARCH_LIMIT: i64 = 20;

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn me(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserInfo>>> {
    let user = UserRepository::find_by_id(&db, claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::success("User retrieved", UserInfo::from(&user))))
}

/// Username substring search over active accounts, excluding the caller.
/// Each hit carries the caller's friend state with that user.
#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn search(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<UserSearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserSearchResult>>>> {
    lib_utils::validate_not_empty(&params.query, "Search query").map_err(AppError::InvalidInput)?;

    let user_id = claims.user_id()?;
    let users = UserRepository::search(&db, &params.query, user_id, SEARCH_LIMIT).await?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        let state = FriendRepository::state(&db, user_id, user.id).await?;
        results.push(UserSearchResult::new(user, state));
    }

    Ok(Json(ApiResponse::success("Users retrieved", results)))
}
