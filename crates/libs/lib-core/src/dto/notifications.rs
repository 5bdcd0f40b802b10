//! # Notification DTOs

use crate::model::store::models::NotificationKind;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/notifications`.
///
/// `kind` uses the same tagged shape as stored notifications, e.g.
/// `{"type": "info"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
