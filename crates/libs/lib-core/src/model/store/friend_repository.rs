//! # Friend Repository
//!
//! One `friendships` row per user pair. A pending row is a request from
//! `sender_id` to `receiver_id`; an accepted row means both are friends. The
//! per-user `friends`, `sent_requests` and `received_requests` lists are views
//! over this table, so the two sides of a request can never disagree.

use super::models::{FriendState, FriendStatus, Friendship, UserSummary};
use sqlx::{query_as, SqliteExecutor};

pub struct FriendRepository;

impl FriendRepository {
    /// The row linking `a` and `b`, in either direction.
    pub async fn find_between(
        db: impl SqliteExecutor<'_>,
        a: i64,
        b: i64,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        query_as::<_, Friendship>(
            r#"
            SELECT *
            FROM friendships
            WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
            LIMIT 1
            "#
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_optional(db)
        .await
    }

    /// Pending request from `sender_id` to `receiver_id`.
    pub async fn find_pending(
        db: impl SqliteExecutor<'_>,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<Option<Friendship>, sqlx::Error> {
        query_as::<_, Friendship>(
            "SELECT * FROM friendships WHERE sender_id = ? AND receiver_id = ? AND status = 'pending'"
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create_request(
        db: impl SqliteExecutor<'_>,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<Friendship, sqlx::Error> {
        let now = lib_utils::now_utc();

        query_as::<_, Friendship>(
            r#"
            INSERT INTO friendships (sender_id, receiver_id, status, created_at, updated_at)
            VALUES (?, ?, 'pending', ?, ?)
            RETURNING *
            "#
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
    }

    /// Flip a pending row to accepted. Returns `false` if it was not pending.
    pub async fn accept(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE friendships SET status = 'accepted', updated_at = ? WHERE id = ? AND status = 'pending'"
        )
        .bind(lib_utils::now_utc())
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Relationship between `viewer` and `other`, from the viewer's side.
    pub async fn state(
        db: impl SqliteExecutor<'_>,
        viewer: i64,
        other: i64,
    ) -> Result<FriendState, sqlx::Error> {
        let state = match Self::find_between(db, viewer, other).await? {
            None => FriendState::None,
            Some(f) if f.status == FriendStatus::Accepted => FriendState::Friends,
            Some(f) if f.sender_id == viewer => FriendState::RequestSent,
            Some(_) => FriendState::RequestReceived,
        };
        Ok(state)
    }

    pub async fn friends_of(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username
            FROM friendships f
            JOIN users u ON u.id = CASE WHEN f.sender_id = ? THEN f.receiver_id ELSE f.sender_id END
            WHERE (f.sender_id = ? OR f.receiver_id = ?) AND f.status = 'accepted'
            ORDER BY u.username ASC
            "#
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Users that `user_id` has a pending request out to.
    pub async fn sent_requests(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username
            FROM friendships f
            JOIN users u ON u.id = f.receiver_id
            WHERE f.sender_id = ? AND f.status = 'pending'
            ORDER BY f.created_at DESC, f.id DESC
            "#
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Users with a pending request addressed to `user_id`.
    pub async fn received_requests(
        db: impl SqliteExecutor<'_>,
        user_id: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username
            FROM friendships f
            JOIN users u ON u.id = f.sender_id
            WHERE f.receiver_id = ? AND f.status = 'pending'
            ORDER BY f.created_at DESC, f.id DESC
            "#
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
