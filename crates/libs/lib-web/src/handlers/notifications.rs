//! # Notification Handlers
//!
//! Every route acts on the caller's own inbox; another user's notification
//! id is reported as not found.
//!
//! - `GET /api/notifications` - Newest first
//! - `POST /api/notifications` - Create an `info`/`warning`/`success` notification
//!   (for another user only as an admin)
//! - `GET /api/notifications/unread-count`
//! - `PUT /api/notifications/read-all`
//! - `PUT /api/notifications/{id}/read`
//! - `DELETE /api/notifications/{id}`

use crate::services::NotificationService;
use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use lib_auth::Claims;
use lib_core::dto::{ApiResponse, CreateNotificationRequest, MarkAllReadResponse, UnreadCountResponse};
use lib_core::model::store::models::Notification;
use lib_core::{DbPool, Result};
use tracing::instrument;

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn list_notifications(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<Notification>>>> {
    let notifications = NotificationService::new(db).list(claims.user_id()?).await?;

    Ok(Json(ApiResponse::success("Notifications retrieved", notifications)))
}

#[instrument(skip(db, claims, req), fields(user_id = %claims.sub))]
pub async fn create_notification(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>)> {
    let notification = NotificationService::new(db).create(claims.user_id()?, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Notification created", notification)),
    ))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn unread_count(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UnreadCountResponse>>> {
    let unread_count = NotificationService::new(db).unread_count(claims.user_id()?).await?;

    Ok(Json(ApiResponse::success(
        "Unread count retrieved",
        UnreadCountResponse { unread_count },
    )))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn mark_all_read(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<MarkAllReadResponse>>> {
    let updated = NotificationService::new(db).mark_all_read(claims.user_id()?).await?;

    Ok(Json(ApiResponse::success(
        "All notifications marked as read",
        MarkAllReadResponse { updated },
    )))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn mark_read(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Notification>>> {
    let notification = NotificationService::new(db).mark_read(id, claims.user_id()?).await?;

    Ok(Json(ApiResponse::success("Notification marked as read", notification)))
}

#[instrument(skip(db, claims), fields(user_id = %claims.sub))]
pub async fn delete_notification(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    NotificationService::new(db).delete(id, claims.user_id()?).await?;

    Ok(Json(ApiResponse::success("Notification deleted", ())))
}
