//! # Settings Handlers
//!
//! - `GET /api/settings` - Public; read from the database on every request
//! - `PUT /api/settings` - Admin only, partial update

use crate::services::SettingsService;
use axum::extract::{Extension, Json, State};
use lib_auth::Claims;
use lib_core::dto::ApiResponse;
use lib_core::model::store::models::{AppSettings, SettingsForUpdate};
use lib_core::{DbPool, Result};
use tracing::instrument;

#[instrument(skip(db))]
pub async fn get_settings(State(db): State<DbPool>) -> Result<Json<ApiResponse<AppSettings>>> {
    let settings = SettingsService::new(db).get().await?;

    Ok(Json(ApiResponse::success("Settings retrieved", settings)))
}

#[instrument(skip(db, claims, update), fields(user_id = %claims.sub))]
pub async fn update_settings(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(update): Json<SettingsForUpdate>,
) -> Result<Json<ApiResponse<AppSettings>>> {
    let settings = SettingsService::new(db).update(claims.user_id()?, update).await?;

    Ok(Json(ApiResponse::success("Settings updated", settings)))
}
