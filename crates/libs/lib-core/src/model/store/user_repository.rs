//! # User Repository
//!
//! Provides database access layer for user accounts.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{UserRepository, create_memory_pool};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_memory_pool().await?;
//!
//! let user = UserRepository::create(&pool, "alice", "alice@example.com", "hashed_password").await?;
//!
//! let found = UserRepository::find_by_email(&pool, "alice@example.com").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserRole, UserSummary};
use super::DbPool;
use sqlx::{query_as, SqliteExecutor};

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by id.
    pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by their email address.
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by their username.
    pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Public summary of an active user, if one exists with this id.
    pub async fn find_summary(
        db: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<UserSummary>, sqlx::Error> {
        query_as::<_, UserSummary>("SELECT id, username FROM users WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Create a new user in the database.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Username already exists (UNIQUE constraint violation)
    /// - Email already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create(
        pool: &DbPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)"
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update the last login timestamp for a user.
    ///
    /// Succeeds without touching any row when the id is unknown.
    pub async fn update_last_login(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Change a user's role. Returns `false` when no user has that email.
    pub async fn set_role_by_email(pool: &DbPool, email: &str, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET role = ?, updated_at = CURRENT_TIMESTAMP WHERE email = ?"
        )
        .bind(role.as_str())
        .bind(email)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Search active users by username substring, excluding `exclude_id`.
    pub async fn search(
        pool: &DbPool,
        query: &str,
        exclude_id: i64,
        limit: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let pattern = format!("%{}%", query.trim());

        query_as::<_, UserSummary>(
            r#"
            SELECT id, username
            FROM users
            WHERE username LIKE ?
              AND id != ?
              AND is_active = 1
            ORDER BY username ASC
            LIMIT ?
            "#
        )
        .bind(pattern)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Ids from `ids` that belong to active users.
    pub async fn existing_ids(
        conn: &mut sqlx::SqliteConnection,
        ids: &[i64],
    ) -> Result<Vec<i64>, sqlx::Error> {
        let mut found = Vec::with_capacity(ids.len());
        for &id in ids {
            if Self::find_summary(&mut *conn, id).await?.is_some() {
                found.push(id);
            }
        }
        Ok(found)
    }
}
