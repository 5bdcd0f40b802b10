//! # Settings Repository
//!
//! `app_settings` holds exactly one row (`id = 1`), seeded by the initial migration.

use super::models::{AppSettings, SettingsForUpdate};
use sqlx::{query_as, SqliteExecutor};

pub struct SettingsRepository;

impl SettingsRepository {
    pub async fn get(db: impl SqliteExecutor<'_>) -> Result<AppSettings, sqlx::Error> {
        query_as::<_, AppSettings>(
            "SELECT site_name, allow_registrations, max_message_length, updated_at FROM app_settings WHERE id = 1"
        )
        .fetch_one(db)
        .await
    }

    /// Apply the `Some` fields of `update` and return the resulting settings.
    pub async fn update(
        db: impl SqliteExecutor<'_>,
        update: &SettingsForUpdate,
    ) -> Result<AppSettings, sqlx::Error> {
        query_as::<_, AppSettings>(
            r#"
            UPDATE app_settings
            SET site_name = COALESCE(?, site_name),
                allow_registrations = COALESCE(?, allow_registrations),
                max_message_length = COALESCE(?, max_message_length),
                updated_at = ?
            WHERE id = 1
            RETURNING site_name, allow_registrations, max_message_length, updated_at
            "#
        )
        .bind(&update.site_name)
        .bind(update.allow_registrations)
        .bind(update.max_message_length)
        .bind(lib_utils::now_utc())
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::setup_test_db;

    #[tokio::test]
    async fn test_seeded_defaults() {
        let pool = setup_test_db().await;

        let settings = SettingsRepository::get(&pool).await.unwrap();

        assert_eq!(settings.site_name, "Mosaic Connect");
        assert!(settings.allow_registrations);
        assert_eq!(settings.max_message_length, 10000);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let pool = setup_test_db().await;

        let updated = SettingsRepository::update(
            &pool,
            &SettingsForUpdate {
                allow_registrations: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(!updated.allow_registrations);
        assert_eq!(updated.site_name, "Mosaic Connect");
        assert_eq!(SettingsRepository::get(&pool).await.unwrap(), updated);
    }
}
