//! # Settings Service
//!
//! Reads and updates the persisted settings record. Nothing is cached in
//! process: every request sees the current row.

use lib_core::model::store::models::{AppSettings, SettingsForUpdate};
use lib_core::model::store::{SettingsRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use tracing::{info, instrument};

/// Bounds accepted for `max_message_length`.
const MESSAGE_LENGTH_RANGE: std::ops::RangeInclusive<i64> = 1..=100_000;

pub struct SettingsService {
    db: DbPool,
}

impl SettingsService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn get(&self) -> Result<AppSettings> {
        Ok(SettingsRepository::get(&self.db).await?)
    }

    /// Apply a partial update. Only admins may change settings.
    #[instrument(skip(self, update))]
    pub async fn update(&self, user_id: i64, mut update: SettingsForUpdate) -> Result<AppSettings> {
        let user = UserRepository::find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        if let Some(name) = update.site_name.as_deref() {
            lib_utils::validate_not_empty(name, "Site name").map_err(AppError::InvalidInput)?;
            update.site_name = Some(name.trim().to_string());
        }
        if let Some(max) = update.max_message_length {
            if !MESSAGE_LENGTH_RANGE.contains(&max) {
                return Err(AppError::InvalidInput(format!(
                    "Max message length must be between {} and {}",
                    MESSAGE_LENGTH_RANGE.start(),
                    MESSAGE_LENGTH_RANGE.end()
                )));
            }
        }

        let settings = SettingsRepository::update(&self.db, &update).await?;

        info!(admin = %user.username, "Settings updated");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_admin, create_user, setup_test_db};

    #[tokio::test]
    async fn test_update_requires_admin() {
        let pool = setup_test_db().await;
        let user = create_user(&pool, "alice").await;
        let admin = create_admin(&pool, "root").await;
        let service = SettingsService::new(pool);

        let update = SettingsForUpdate {
            site_name: Some(" Mosaic ".to_string()),
            ..Default::default()
        };

        let err = service.update(user.id, update.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(service.get().await.unwrap().site_name, "Mosaic Connect");

        let updated = service.update(admin.id, update).await.unwrap();
        assert_eq!(updated.site_name, "Mosaic");
        assert_eq!(service.get().await.unwrap().site_name, "Mosaic");
    }

    #[tokio::test]
    async fn test_update_validates_values() {
        let pool = setup_test_db().await;
        let admin = create_admin(&pool, "root").await;
        let service = SettingsService::new(pool);

        let err = service
            .update(
                admin.id,
                SettingsForUpdate {
                    max_message_length: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .update(
                admin.id,
                SettingsForUpdate {
                    site_name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
