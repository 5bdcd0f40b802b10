//! # Notification Repository
//!
//! Every query is scoped by the owning `user_id`; a notification that belongs to
//! somebody else behaves exactly like one that does not exist.

use super::models::{Notification, NotificationForCreate, NotificationRow};
use crate::error::Result;
use sqlx::{query_as, SqliteExecutor};

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create(db: impl SqliteExecutor<'_>, data: &NotificationForCreate) -> Result<Notification> {
        let now = lib_utils::now_utc();
        let payload = serde_json::to_string(&data.kind)?;

        let row = query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, title, message, kind, payload, link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#
        )
        .bind(data.user_id)
        .bind(&data.title)
        .bind(&data.message)
        .bind(data.kind.tag())
        .bind(payload)
        .bind(&data.link)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await?;

        Ok(Notification::try_from(row)?)
    }

    /// Notifications of a user, newest first.
    pub async fn list_for_user(db: impl SqliteExecutor<'_>, user_id: i64) -> Result<Vec<Notification>> {
        let rows = query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        rows.into_iter()
            .map(|row| Ok(Notification::try_from(row)?))
            .collect()
    }

    pub async fn find_for_user(
        db: impl SqliteExecutor<'_>,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Notification>> {
        let row = query_as::<_, NotificationRow>("SELECT * FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;

        row.map(Notification::try_from).transpose().map_err(Into::into)
    }

    pub async fn unread_count(db: impl SqliteExecutor<'_>, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0"
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    /// Returns `false` when the notification does not exist for this user.
    pub async fn mark_read(db: impl SqliteExecutor<'_>, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ? WHERE id = ? AND user_id = ?"
        )
        .bind(lib_utils::now_utc())
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Mark every unread notification of the user as read. Returns how many changed.
    pub async fn mark_all_read(db: impl SqliteExecutor<'_>, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ? WHERE user_id = ? AND is_read = 0"
        )
        .bind(lib_utils::now_utc())
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(db: impl SqliteExecutor<'_>, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove the friend-request notification `sender_id` caused for `user_id`.
    pub async fn delete_friend_request(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        sender_id: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE user_id = ? AND kind = 'friend_request'
              AND json_extract(payload, '$.sender_id') = ?
            "#
        )
        .bind(user_id)
        .bind(sender_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark the friend-request notification `sender_id` caused for `user_id` as read.
    pub async fn mark_friend_request_read(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
        sender_id: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = 1, updated_at = ?
            WHERE user_id = ? AND kind = 'friend_request' AND is_read = 0
              AND json_extract(payload, '$.sender_id') = ?
            "#
        )
        .bind(lib_utils::now_utc())
        .bind(user_id)
        .bind(sender_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::models::NotificationKind;
    use crate::model::store::test_support::{create_user, setup_test_db};

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let pool = setup_test_db().await;
        let user = create_user(&pool, "alice").await;

        let first = NotificationRepository::create(
            &pool,
            &NotificationForCreate::new(user.id, "Welcome", "Hello there", NotificationKind::Info),
        )
        .await
        .unwrap();
        let second = NotificationRepository::create(
            &pool,
            &NotificationForCreate::new(user.id, "Heads up", "Maintenance", NotificationKind::Warning)
                .link("/status"),
        )
        .await
        .unwrap();

        let listed = NotificationRepository::list_for_user(&pool, user.id).await.unwrap();

        assert_eq!(listed.iter().map(|n| n.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(listed[0].link.as_deref(), Some("/status"));
        assert_eq!(listed[0].kind, NotificationKind::Warning);
        assert!(!listed[0].is_read);
    }

    #[tokio::test]
    async fn test_other_users_notification_is_invisible() {
        let pool = setup_test_db().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let note = NotificationRepository::create(
            &pool,
            &NotificationForCreate::new(alice.id, "Hi", "For alice", NotificationKind::Info),
        )
        .await
        .unwrap();

        assert!(NotificationRepository::find_for_user(&pool, note.id, bob.id).await.unwrap().is_none());
        assert!(!NotificationRepository::mark_read(&pool, note.id, bob.id).await.unwrap());
        assert!(!NotificationRepository::delete(&pool, note.id, bob.id).await.unwrap());

        assert!(NotificationRepository::delete(&pool, note.id, alice.id).await.unwrap());
        assert!(NotificationRepository::find_for_user(&pool, note.id, alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_changes() {
        let pool = setup_test_db().await;
        let user = create_user(&pool, "alice").await;

        for title in ["a", "b", "c"] {
            NotificationRepository::create(
                &pool,
                &NotificationForCreate::new(user.id, title, "body", NotificationKind::Success),
            )
            .await
            .unwrap();
        }
        let listed = NotificationRepository::list_for_user(&pool, user.id).await.unwrap();
        assert!(NotificationRepository::mark_read(&pool, listed[0].id, user.id).await.unwrap());

        assert_eq!(NotificationRepository::unread_count(&pool, user.id).await.unwrap(), 2);
        assert_eq!(NotificationRepository::mark_all_read(&pool, user.id).await.unwrap(), 2);
        assert_eq!(NotificationRepository::unread_count(&pool, user.id).await.unwrap(), 0);
        assert_eq!(NotificationRepository::mark_all_read(&pool, user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_friend_request_notification_matched_by_sender() {
        let pool = setup_test_db().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let carol = create_user(&pool, "carol").await;

        for sender in [&alice, &carol] {
            NotificationRepository::create(
                &pool,
                &NotificationForCreate::new(
                    bob.id,
                    "Friend request",
                    format!("{} sent you a friend request", sender.username),
                    NotificationKind::FriendRequest { sender_id: sender.id },
                ),
            )
            .await
            .unwrap();
        }

        assert_eq!(NotificationRepository::mark_friend_request_read(&pool, bob.id, carol.id).await.unwrap(), 1);
        assert_eq!(NotificationRepository::delete_friend_request(&pool, bob.id, alice.id).await.unwrap(), 1);

        let left = NotificationRepository::list_for_user(&pool, bob.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].kind, NotificationKind::FriendRequest { sender_id: carol.id });
        assert!(left[0].is_read);
    }
}
