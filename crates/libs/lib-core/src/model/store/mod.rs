//! # Database Store
//!
//! Database connection pool, embedded migrations and repository implementations.
//!
//! Repositories are stateless unit structs. Single-statement methods accept any
//! `SqliteExecutor` (a `&DbPool` or `&mut *tx`); methods issuing several statements
//! take `&mut SqliteConnection` so callers can run them inside one transaction.

// region: --- Modules
pub mod models;
pub mod user_repository;
pub mod friend_repository;
pub mod conversation_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod settings_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use user_repository::UserRepository;
pub use friend_repository::FriendRepository;
pub use conversation_repository::ConversationRepository;
pub use message_repository::MessageRepository;
pub use notification_repository::NotificationRepository;
pub use settings_repository::SettingsRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a new SQLite connection pool, creating the database file if needed.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Create a migrated in-memory database.
///
/// The pool holds exactly one connection that never expires: every new
/// in-memory connection would otherwise be a separate, empty database.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply the migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../../migrations").run(pool).await
}
// endregion: --- Types and Functions
