//! # Messaging Service
//!
//! Sending, reading, editing and deleting messages, with the unread counters,
//! read receipts and message notifications kept in step.
//!
//! ## Side effects of sending
//!
//! One transaction covers all of them, so a failure leaves nothing behind:
//!
//! ```text
//! insert message (read_by = [sender])
//!   → conversation.last_message = message
//!   → unread_count += 1 for every other participant
//!   → `message` notification for every other participant that has not muted
//! ```

use crate::services::conversations::load_for_participant;
use lib_core::dto::SendMessageRequest;
use lib_core::model::store::message_repository::MessageForCreate;
use lib_core::model::store::models::{
    LastMessage, Message, MessageType, NotificationForCreate, NotificationKind,
};
use lib_core::model::store::{
    ConversationRepository, MessageRepository, NotificationRepository, SettingsRepository,
};
use lib_core::{AppError, DbPool, Result};
use sqlx::SqliteConnection;
use tracing::{debug, info, instrument};

/// Length of the message excerpt carried in notification bodies.
const PREVIEW_CHARS: usize = 100;

pub struct MessagingService {
    db: DbPool,
}

impl MessagingService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    #[instrument(skip(self, req))]
    pub async fn send_message(
        &self,
        conversation_id: i64,
        sender_id: i64,
        req: SendMessageRequest,
    ) -> Result<Message> {
        let mut tx = self.db.begin().await?;

        let conversation = load_for_participant(&mut tx, conversation_id, sender_id).await?;

        let settings = SettingsRepository::get(&mut *tx).await?;
        let content = validate_content(&req.content, settings.max_message_length)?;

        if req.message_type == MessageType::System {
            return Err(AppError::InvalidInput("System messages cannot be sent".to_string()));
        }

        if let Some(reply_to) = req.reply_to {
            let original = MessageRepository::find_row(&mut *tx, reply_to).await?;
            if original.map(|m| m.conversation_id) != Some(conversation_id) {
                return Err(AppError::InvalidInput(
                    "Replied message is not part of this conversation".to_string(),
                ));
            }
        }

        let message = MessageRepository::create(
            &mut tx,
            &MessageForCreate {
                conversation_id,
                sender_id,
                content,
                message_type: req.message_type,
                attachments: req.attachments,
                reply_to: req.reply_to,
            },
        )
        .await?;

        ConversationRepository::set_last_message(
            &mut *tx,
            conversation_id,
            &LastMessage {
                message_id: message.id,
                sender_id,
                content: message.content.clone(),
                sent_at: message.created_at,
            },
        )
        .await?;

        let bumped = ConversationRepository::increment_unread_except(&mut *tx, conversation_id, sender_id).await?;
        debug!("Unread bumped for {} participant(s)", bumped);

        let sender_name = conversation
            .participant(sender_id)
            .map(|p| p.username.clone())
            .unwrap_or_default();
        let title = match &conversation.name {
            Some(name) => format!("{sender_name} in {name}"),
            None => format!("New message from {sender_name}"),
        };
        let preview: String = message.content.chars().take(PREVIEW_CHARS).collect();

        let recipients = conversation
            .participants
            .iter()
            .filter(|p| p.user_id != sender_id && !p.muted);
        for recipient in recipients {
            NotificationRepository::create(
                &mut *tx,
                &NotificationForCreate::new(
                    recipient.user_id,
                    title.clone(),
                    preview.clone(),
                    NotificationKind::Message {
                        conversation_id,
                        message_id: message.id,
                        sender_id,
                    },
                )
                .link(format!("/conversations/{conversation_id}")),
            )
            .await?;
        }

        tx.commit().await?;

        info!(conversation_id, message_id = message.id, "Message sent");
        Ok(message)
    }

    /// Visible messages of the conversation, oldest first. Marks them all read
    /// for the requester and clears their unread counter.
    #[instrument(skip(self))]
    pub async fn get_messages(&self, conversation_id: i64, user_id: i64) -> Result<Vec<Message>> {
        let mut tx = self.db.begin().await?;

        load_for_participant(&mut tx, conversation_id, user_id).await?;

        let marked = MessageRepository::mark_conversation_read(&mut *tx, conversation_id, user_id).await?;
        ConversationRepository::reset_unread(&mut *tx, conversation_id, user_id).await?;
        let messages = MessageRepository::list_visible(&mut tx, conversation_id).await?;

        tx.commit().await?;

        debug!("Marked {} message(s) read", marked);
        Ok(messages)
    }

    /// Direct lookup. Soft-deleted messages are returned too.
    #[instrument(skip(self))]
    pub async fn get_message(&self, conversation_id: i64, message_id: i64, user_id: i64) -> Result<Message> {
        let mut conn = self.db.acquire().await?;

        load_for_participant(&mut conn, conversation_id, user_id).await?;
        find_in_conversation(&mut conn, conversation_id, message_id).await
    }

    #[instrument(skip(self, content))]
    pub async fn edit_message(
        &self,
        conversation_id: i64,
        message_id: i64,
        editor_id: i64,
        content: &str,
    ) -> Result<Message> {
        let mut tx = self.db.begin().await?;

        load_for_participant(&mut tx, conversation_id, editor_id).await?;
        let message = find_in_conversation(&mut tx, conversation_id, message_id).await?;

        if message.sender_id != editor_id {
            return Err(AppError::Forbidden("You can only edit your own messages".to_string()));
        }
        if message.is_deleted {
            return Err(AppError::InvalidInput("Deleted messages cannot be edited".to_string()));
        }

        let settings = SettingsRepository::get(&mut *tx).await?;
        let content = validate_content(content, settings.max_message_length)?;

        MessageRepository::update_content(&mut *tx, message_id, &content).await?;
        let edited = find_in_conversation(&mut tx, conversation_id, message_id).await?;

        tx.commit().await?;

        info!(message_id, "Message edited");
        Ok(edited)
    }

    /// Soft delete. Deleting an already deleted message succeeds again.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, conversation_id: i64, message_id: i64, user_id: i64) -> Result<()> {
        let mut tx = self.db.begin().await?;

        load_for_participant(&mut tx, conversation_id, user_id).await?;
        let message = find_in_conversation(&mut tx, conversation_id, message_id).await?;

        if message.sender_id != user_id {
            return Err(AppError::Forbidden("You can only delete your own messages".to_string()));
        }

        MessageRepository::soft_delete(&mut *tx, message_id).await?;
        tx.commit().await?;

        info!(message_id, "Message deleted");
        Ok(())
    }

    /// Record a read receipt. The unread counter only drops when the receipt is new
    /// and the message was counted as unread when it was sent.
    #[instrument(skip(self))]
    pub async fn mark_as_read(&self, conversation_id: i64, message_id: i64, user_id: i64) -> Result<Message> {
        let mut tx = self.db.begin().await?;

        load_for_participant(&mut tx, conversation_id, user_id).await?;
        let message = find_in_conversation(&mut tx, conversation_id, message_id).await?;
        let counted = message.message_type != MessageType::System && message.sender_id != user_id;

        if MessageRepository::mark_read(&mut *tx, message_id, user_id).await? && counted {
            ConversationRepository::decrement_unread(&mut *tx, conversation_id, user_id).await?;
        }
        let message = find_in_conversation(&mut tx, conversation_id, message_id).await?;

        tx.commit().await?;
        Ok(message)
    }
}

/// Message `message_id`, which must belong to `conversation_id`.
async fn find_in_conversation(conn: &mut SqliteConnection, conversation_id: i64, message_id: i64) -> Result<Message> {
    MessageRepository::find(conn, message_id)
        .await?
        .filter(|m| m.conversation_id == conversation_id)
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
}

/// Trimmed content, provided it is non-empty and within `max_len` characters.
fn validate_content(content: &str, max_len: i64) -> Result<String> {
    lib_utils::validate_not_empty(content, "Message content").map_err(AppError::InvalidInput)?;

    let content = content.trim();
    let max_len = usize::try_from(max_len).unwrap_or(0);
    lib_utils::validate_max_length(content, max_len, "Message content").map_err(AppError::InvalidInput)?;

    Ok(content.to_string())
}
