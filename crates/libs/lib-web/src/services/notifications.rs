//! # Notification Service
//!
//! Creation through the API is limited to the plain kinds (`info`, `warning`,
//! `success`). Message and friend notifications are only produced as side
//! effects of the messaging and friend flows. Users may notify themselves;
//! notifying anyone else requires the `admin` role.

use lib_core::dto::CreateNotificationRequest;
use lib_core::model::store::models::{Notification, NotificationForCreate, NotificationKind};
use lib_core::model::store::{NotificationRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use tracing::{info, instrument};

pub struct NotificationService {
    db: DbPool,
}

impl NotificationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    #[instrument(skip(self, req), fields(user_id = req.user_id, kind = req.kind.tag()))]
    pub async fn create(&self, caller_id: i64, req: CreateNotificationRequest) -> Result<Notification> {
        if !matches!(
            req.kind,
            NotificationKind::Info | NotificationKind::Warning | NotificationKind::Success
        ) {
            return Err(AppError::InvalidInput(format!(
                "Notification type '{}' cannot be created directly",
                req.kind.tag()
            )));
        }
        lib_utils::validate_not_empty(&req.title, "Title").map_err(AppError::InvalidInput)?;
        lib_utils::validate_not_empty(&req.message, "Message").map_err(AppError::InvalidInput)?;

        if req.user_id != caller_id {
            let caller = UserRepository::find_by_id(&self.db, caller_id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
            if !caller.is_admin() {
                return Err(AppError::Forbidden(
                    "Admin access required to notify other users".to_string(),
                ));
            }
        }

        UserRepository::find_summary(&self.db, req.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut data = NotificationForCreate::new(req.user_id, req.title, req.message, req.kind);
        data.link = req.link;

        let notification = NotificationRepository::create(&self.db, &data).await?;

        info!(notification_id = notification.id, "Notification created");
        Ok(notification)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Notification>> {
        NotificationRepository::list_for_user(&self.db, user_id).await
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        NotificationRepository::unread_count(&self.db, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: i64, user_id: i64) -> Result<Notification> {
        if !NotificationRepository::mark_read(&self.db, id, user_id).await? {
            return Err(not_found());
        }

        NotificationRepository::find_for_user(&self.db, id, user_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Returns how many notifications changed state.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        NotificationRepository::mark_all_read(&self.db, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<()> {
        if !NotificationRepository::delete(&self.db, id, user_id).await? {
            return Err(not_found());
        }
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Notification not found".to_string())
}
