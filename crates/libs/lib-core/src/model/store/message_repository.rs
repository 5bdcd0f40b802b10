//! # Message Repository
//!
//! Messages are soft-deleted: listing skips `is_deleted` rows, lookup by id
//! does not. Read receipts live in `message_reads`, keyed by
//! `(message_id, user_id)`, which makes recording a read idempotent.

use super::models::{Attachment, Message, MessageRow, MessageType};
use crate::error::Result;
use sqlx::{query_as, SqliteConnection, SqliteExecutor};
use std::collections::HashMap;

/// Data for inserting a message.
#[derive(Debug, Clone)]
pub struct MessageForCreate {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<i64>,
}

pub struct MessageRepository;

impl MessageRepository {
    /// Insert the message and record the sender as its first reader.
    pub async fn create(conn: &mut SqliteConnection, data: &MessageForCreate) -> Result<Message> {
        let now = lib_utils::now_utc();
        let attachments = serde_json::to_string(&data.attachments)?;

        let row = query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages
                (conversation_id, sender_id, content, message_type, attachments, reply_to, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#
        )
        .bind(data.conversation_id)
        .bind(data.sender_id)
        .bind(&data.content)
        .bind(data.message_type.as_str())
        .bind(attachments)
        .bind(data.reply_to)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Self::mark_read(&mut *conn, row.id, data.sender_id).await?;

        Ok(Message::from_row(row, vec![data.sender_id])?)
    }

    /// Raw row by id, soft-deleted rows included.
    pub async fn find_row(db: impl SqliteExecutor<'_>, id: i64) -> Result<Option<MessageRow>> {
        let row = query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    /// Message by id with its read receipts, soft-deleted rows included.
    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Message>> {
        let Some(row) = Self::find_row(&mut *conn, id).await? else {
            return Ok(None);
        };
        let read_by = Self::read_by(&mut *conn, id).await?;

        Ok(Some(Message::from_row(row, read_by)?))
    }

    /// Non-deleted messages of a conversation, oldest first.
    pub async fn list_visible(conn: &mut SqliteConnection, conversation_id: i64) -> Result<Vec<Message>> {
        let rows = query_as::<_, MessageRow>(
            r#"
            SELECT *
            FROM messages
            WHERE conversation_id = ? AND is_deleted = 0
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(conversation_id)
        .fetch_all(&mut *conn)
        .await?;

        let reads = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT r.message_id, r.user_id
            FROM message_reads r
            JOIN messages m ON m.id = r.message_id
            WHERE m.conversation_id = ? AND m.is_deleted = 0
            ORDER BY r.read_at ASC, r.user_id ASC
            "#
        )
        .bind(conversation_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut readers: HashMap<i64, Vec<i64>> = HashMap::new();
        for (message_id, user_id) in reads {
            readers.entry(message_id).or_default().push(user_id);
        }

        rows.into_iter()
            .map(|row| {
                let read_by = readers.remove(&row.id).unwrap_or_default();
                Ok(Message::from_row(row, read_by)?)
            })
            .collect()
    }

    pub async fn read_by(db: impl SqliteExecutor<'_>, message_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM message_reads WHERE message_id = ? ORDER BY read_at ASC, user_id ASC"
        )
        .bind(message_id)
        .fetch_all(db)
        .await?;
        Ok(ids)
    }

    /// Record that `user_id` read the message. Returns `true` only if this is new.
    pub async fn mark_read(db: impl SqliteExecutor<'_>, message_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO message_reads (message_id, user_id, read_at) VALUES (?, ?, ?)"
        )
        .bind(message_id)
        .bind(user_id)
        .bind(lib_utils::now_utc())
        .execute(db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Mark every visible message in the conversation not sent by `user_id` as read by them.
    ///
    /// Returns how many receipts were added.
    pub async fn mark_conversation_read(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        user_id: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO message_reads (message_id, user_id, read_at)
            SELECT id, ?, ?
            FROM messages
            WHERE conversation_id = ? AND sender_id != ? AND is_deleted = 0
            "#
        )
        .bind(user_id)
        .bind(lib_utils::now_utc())
        .bind(conversation_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_content(db: impl SqliteExecutor<'_>, id: i64, content: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE messages SET content = ?, is_edited = 1, updated_at = ? WHERE id = ?"
        )
        .bind(content)
        .bind(lib_utils::now_utc())
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Set the deleted flag. Deleting an already deleted message still succeeds.
    pub async fn soft_delete(db: impl SqliteExecutor<'_>, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE messages SET is_deleted = 1, updated_at = ? WHERE id = ?")
            .bind(lib_utils::now_utc())
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
