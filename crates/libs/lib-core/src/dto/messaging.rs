//! # Conversation and Message DTOs
//!
//! - `POST /api/conversations` - [`CreateConversationRequest`] -> `Conversation`
//! - `GET /api/conversations` -> `Vec<`[`ConversationSummary`]`>`
//! - `PUT /api/conversations/{id}/mute` - [`MuteRequest`]
//! - `POST /api/conversations/{id}/messages` - [`SendMessageRequest`] -> `Message`
//! - `PUT /api/conversations/{id}/messages/{mid}` - [`EditMessageRequest`] -> `Message`

use crate::model::store::models::{Attachment, Conversation, ConversationType, MessageType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub conversation_type: ConversationType,
    /// Users to add besides the caller. A private conversation takes exactly one.
    pub participant_ids: Vec<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteRequest {
    pub muted: bool,
}

/// Body of a new message. `message_type` defaults to `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub reply_to: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// A conversation as listed for one user, with that user's unread count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub unread_count: i64,
}

impl ConversationSummary {
    pub fn for_user(conversation: Conversation, user_id: i64) -> Self {
        let unread_count = conversation.unread_for(user_id);
        Self { conversation, unread_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_defaults() {
        let request: SendMessageRequest = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();

        assert_eq!(request.message_type, MessageType::Text);
        assert!(request.attachments.is_empty());
        assert!(request.reply_to.is_none());
    }

    #[test]
    fn test_create_conversation_rejects_unknown_type() {
        let result: Result<CreateConversationRequest, _> =
            serde_json::from_str(r#"{"conversation_type":"channel","participant_ids":[2]}"#);

        assert!(result.is_err());
    }
}
