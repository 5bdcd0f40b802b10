//! # Conversation Service
//!
//! Creating, listing and muting conversations. A private conversation between
//! two users is unique: creating it again returns the existing one.

use lib_core::dto::{ConversationSummary, CreateConversationRequest};
use lib_core::model::store::conversation_repository::ConversationForCreate;
use lib_core::model::store::message_repository::MessageForCreate;
use lib_core::model::store::models::{Conversation, ConversationType, LastMessage, MessageType};
use lib_core::model::store::{ConversationRepository, MessageRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use sqlx::SqliteConnection;
use tracing::{debug, info, instrument};

pub struct ConversationService {
    db: DbPool,
}

impl ConversationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Create a conversation. Returns it together with `true` when it is new.
    #[instrument(skip(self, req), fields(kind = %req.conversation_type))]
    pub async fn create(&self, creator_id: i64, req: CreateConversationRequest) -> Result<(Conversation, bool)> {
        let mut members: Vec<i64> = Vec::with_capacity(req.participant_ids.len());
        for id in req.participant_ids {
            if id != creator_id && !members.contains(&id) {
                members.push(id);
            }
        }

        let mut tx = self.db.begin().await?;

        let creator = UserRepository::find_summary(&mut *tx, creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let existing = UserRepository::existing_ids(&mut tx, &members).await?;
        if existing.len() != members.len() {
            return Err(AppError::NotFound("One or more participants not found".to_string()));
        }

        let name = req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let (id, created) = match req.conversation_type {
            ConversationType::Private => {
                let &[other] = members.as_slice() else {
                    return Err(AppError::InvalidInput(
                        "A private conversation needs exactly one other participant".to_string(),
                    ));
                };

                let existing_private =
                    ConversationRepository::find_private_between(&mut *tx, creator_id, other).await?;
                match existing_private {
                    Some(id) => {
                        debug!("Reusing private conversation {}", id);
                        (id, false)
                    }
                    None => {
                        let data = ConversationForCreate {
                            conversation_type: ConversationType::Private,
                            name: None,
                            image: req.image,
                            creator_id,
                            member_ids: members,
                        };
                        (ConversationRepository::create(&mut tx, &data).await?, true)
                    }
                }
            }
            ConversationType::Group => {
                let Some(name) = name else {
                    return Err(AppError::InvalidInput("Group name is required".to_string()));
                };
                if members.is_empty() {
                    return Err(AppError::InvalidInput(
                        "A group needs at least one other participant".to_string(),
                    ));
                }

                let data = ConversationForCreate {
                    conversation_type: ConversationType::Group,
                    name: Some(name),
                    image: req.image,
                    creator_id,
                    member_ids: members,
                };
                let id = ConversationRepository::create(&mut tx, &data).await?;
                announce_group(&mut tx, id, creator_id, &creator.username).await?;
                (id, true)
            }
        };

        let conversation = ConversationRepository::find(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Conversation {id} vanished after insert")))?;

        tx.commit().await?;

        if created {
            info!(conversation_id = id, "Conversation created");
        }
        Ok((conversation, created))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        let mut conn = self.db.acquire().await?;
        let conversations = ConversationRepository::list_for_user(&mut conn, user_id).await?;

        Ok(conversations
            .into_iter()
            .map(|c| ConversationSummary::for_user(c, user_id))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, conversation_id: i64, user_id: i64) -> Result<Conversation> {
        let mut conn = self.db.acquire().await?;
        load_for_participant(&mut conn, conversation_id, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn set_muted(&self, conversation_id: i64, user_id: i64, muted: bool) -> Result<Conversation> {
        let mut tx = self.db.begin().await?;

        load_for_participant(&mut tx, conversation_id, user_id).await?;
        ConversationRepository::set_muted(&mut *tx, conversation_id, user_id, muted).await?;
        let conversation = load_for_participant(&mut tx, conversation_id, user_id).await?;

        tx.commit().await?;
        Ok(conversation)
    }
}

/// The conversation, provided it exists and `user_id` takes part in it.
pub(crate) async fn load_for_participant(
    conn: &mut SqliteConnection,
    conversation_id: i64,
    user_id: i64,
) -> Result<Conversation> {
    let conversation = ConversationRepository::find(conn, conversation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    if !conversation.is_participant(user_id) {
        return Err(AppError::Forbidden(
            "You are not a participant of this conversation".to_string(),
        ));
    }

    Ok(conversation)
}

/// System message opening a group. Unread counters stay untouched.
async fn announce_group(conn: &mut SqliteConnection, conversation_id: i64, creator_id: i64, creator: &str) -> Result<()> {
    let message = MessageRepository::create(
        &mut *conn,
        &MessageForCreate {
            conversation_id,
            sender_id: creator_id,
            content: format!("{creator} created the group"),
            message_type: MessageType::System,
            attachments: vec![],
            reply_to: None,
        },
    )
    .await?;

    ConversationRepository::set_last_message(
        &mut *conn,
        conversation_id,
        &LastMessage {
            message_id: message.id,
            sender_id: creator_id,
            content: message.content,
            sent_at: message.created_at,
        },
    )
    .await?;

    Ok(())
}
