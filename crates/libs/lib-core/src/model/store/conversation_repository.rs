//! # Conversation Repository
//!
//! Conversations, their participants and the per-participant unread counters.
//! The counter lives on the participant row, so only participants can have one.

use super::models::{
    Conversation, ConversationRow, ConversationType, LastMessage, Participant, ParticipantRole,
};
use sqlx::{query_as, SqliteConnection, SqliteExecutor};

/// Data for creating a conversation.
#[derive(Debug, Clone)]
pub struct ConversationForCreate {
    pub conversation_type: ConversationType,
    pub name: Option<String>,
    pub image: Option<String>,
    pub creator_id: i64,
    /// Participants other than the creator.
    pub member_ids: Vec<i64>,
}

pub struct ConversationRepository;

impl ConversationRepository {
    /// Insert the conversation and all participant rows. Returns the new id.
    ///
    /// The creator joins as [`ParticipantRole::Admin`], everyone else as member.
    pub async fn create(
        conn: &mut SqliteConnection,
        data: &ConversationForCreate,
    ) -> Result<i64, sqlx::Error> {
        let now = lib_utils::now_utc();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO conversations (conversation_type, name, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#
        )
        .bind(data.conversation_type.as_str())
        .bind(&data.name)
        .bind(&data.image)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Self::add_participant(&mut *conn, id, data.creator_id, ParticipantRole::Admin).await?;
        for &member_id in data.member_ids.iter().filter(|&&m| m != data.creator_id) {
            Self::add_participant(&mut *conn, id, member_id, ParticipantRole::Member).await?;
        }

        Ok(id)
    }

    pub async fn add_participant(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        user_id: i64,
        role: ParticipantRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id, joined_at, role)
            VALUES (?, ?, ?, ?)
            "#
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(lib_utils::now_utc())
        .bind(role.as_str())
        .execute(db)
        .await?;

        Ok(())
    }

    pub async fn find_row(
        db: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<ConversationRow>, sqlx::Error> {
        query_as::<_, ConversationRow>("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn participants(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        query_as::<_, Participant>(
            r#"
            SELECT p.user_id, u.username, p.joined_at, p.role, p.muted, p.unread_count
            FROM conversation_participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.conversation_id = ?
            ORDER BY p.joined_at ASC, p.user_id ASC
            "#
        )
        .bind(conversation_id)
        .fetch_all(db)
        .await
    }

    /// Conversation with its participants.
    pub async fn find(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let Some(row) = Self::find_row(&mut *conn, id).await? else {
            return Ok(None);
        };
        let participants = Self::participants(&mut *conn, id).await?;

        Ok(Some(Conversation::from_parts(row, participants)))
    }

    /// Existing private conversation between exactly `a` and `b`.
    pub async fn find_private_between(
        db: impl SqliteExecutor<'_>,
        a: i64,
        b: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT c.id
            FROM conversations c
            JOIN conversation_participants pa ON pa.conversation_id = c.id AND pa.user_id = ?
            JOIN conversation_participants pb ON pb.conversation_id = c.id AND pb.user_id = ?
            WHERE c.conversation_type = 'private'
            ORDER BY c.id ASC
            LIMIT 1
            "#
        )
        .bind(a)
        .bind(b)
        .fetch_optional(db)
        .await
    }

    /// Conversations `user_id` takes part in, most recently active first.
    pub async fn list_for_user(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let rows = query_as::<_, ConversationRow>(
            r#"
            SELECT c.*
            FROM conversations c
            JOIN conversation_participants p ON p.conversation_id = c.id
            WHERE p.user_id = ?
            ORDER BY COALESCE(c.last_message_at, c.created_at) DESC, c.id DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in rows {
            let participants = Self::participants(&mut *conn, row.id).await?;
            conversations.push(Conversation::from_parts(row, participants));
        }

        Ok(conversations)
    }

    pub async fn is_participant(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM conversation_participants WHERE conversation_id = ? AND user_id = ?
            )
            "#
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn set_last_message(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        last: &LastMessage,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_id = ?,
                last_message_sender_id = ?,
                last_message_content = ?,
                last_message_at = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(last.message_id)
        .bind(last.sender_id)
        .bind(&last.content)
        .bind(last.sent_at)
        .bind(last.sent_at)
        .bind(conversation_id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Add one unread message for every participant except `sender_id`.
    pub async fn increment_unread_except(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        sender_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE conversation_participants
            SET unread_count = unread_count + 1
            WHERE conversation_id = ? AND user_id != ?
            "#
        )
        .bind(conversation_id)
        .bind(sender_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn reset_unread(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE conversation_participants SET unread_count = 0 WHERE conversation_id = ? AND user_id = ?"
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Decrement the counter by one, never below zero.
    pub async fn decrement_unread(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE conversation_participants
            SET unread_count = MAX(unread_count - 1, 0)
            WHERE conversation_id = ? AND user_id = ?
            "#
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Returns `false` when the user is not a participant.
    pub async fn set_muted(
        db: impl SqliteExecutor<'_>,
        conversation_id: i64,
        user_id: i64,
        muted: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE conversation_participants SET muted = ? WHERE conversation_id = ? AND user_id = ?"
        )
        .bind(muted)
        .bind(conversation_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::{create_user, setup_test_db};

    async fn group_of_three(pool: &crate::DbPool) -> (i64, [i64; 3]) {
        let a = create_user(pool, "alice").await.id;
        let b = create_user(pool, "bob").await.id;
        let c = create_user(pool, "carol").await.id;

        let mut conn = pool.acquire().await.unwrap();
        let id = ConversationRepository::create(
            &mut conn,
            &ConversationForCreate {
                conversation_type: ConversationType::Group,
                name: Some("trio".into()),
                image: None,
                creator_id: a,
                member_ids: vec![b, c, a],
            },
        )
        .await
        .unwrap();

        (id, [a, b, c])
    }

    #[tokio::test]
    async fn test_create_assigns_roles_once() {
        let pool = setup_test_db().await;
        let (id, [a, b, _]) = group_of_three(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let conversation = ConversationRepository::find(&mut conn, id).await.unwrap().unwrap();

        assert_eq!(conversation.participants.len(), 3);
        assert_eq!(conversation.participant(a).unwrap().role, ParticipantRole::Admin);
        assert_eq!(conversation.participant(b).unwrap().role, ParticipantRole::Member);
        assert!(conversation.last_message.is_none());
    }

    #[tokio::test]
    async fn test_unread_counters() {
        let pool = setup_test_db().await;
        let (id, [a, b, c]) = group_of_three(&pool).await;

        assert_eq!(ConversationRepository::increment_unread_except(&pool, id, a).await.unwrap(), 2);
        ConversationRepository::increment_unread_except(&pool, id, a).await.unwrap();
        ConversationRepository::decrement_unread(&pool, id, b).await.unwrap();
        ConversationRepository::reset_unread(&pool, id, c).await.unwrap();
        // Never below zero
        ConversationRepository::decrement_unread(&pool, id, a).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let conversation = ConversationRepository::find(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(conversation.unread_for(a), 0);
        assert_eq!(conversation.unread_for(b), 1);
        assert_eq!(conversation.unread_for(c), 0);
    }

    #[tokio::test]
    async fn test_find_private_between() {
        let pool = setup_test_db().await;
        let a = create_user(&pool, "alice").await.id;
        let b = create_user(&pool, "bob").await.id;
        let c = create_user(&pool, "carol").await.id;

        let mut conn = pool.acquire().await.unwrap();
        let id = ConversationRepository::create(
            &mut conn,
            &ConversationForCreate {
                conversation_type: ConversationType::Private,
                name: None,
                image: None,
                creator_id: a,
                member_ids: vec![b],
            },
        )
        .await
        .unwrap();

        assert_eq!(ConversationRepository::find_private_between(&mut *conn, b, a).await.unwrap(), Some(id));
        assert_eq!(ConversationRepository::find_private_between(&mut *conn, a, c).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_for_user_and_mute() {
        let pool = setup_test_db().await;
        let (id, [a, b, _]) = group_of_three(&pool).await;
        let outsider = create_user(&pool, "dave").await.id;

        assert!(ConversationRepository::set_muted(&pool, id, b, true).await.unwrap());
        assert!(!ConversationRepository::set_muted(&pool, id, outsider, true).await.unwrap());
        assert!(ConversationRepository::is_participant(&pool, id, a).await.unwrap());
        assert!(!ConversationRepository::is_participant(&pool, id, outsider).await.unwrap());

        let mut conn = pool.acquire().await.unwrap();
        let listed = ConversationRepository::list_for_user(&mut conn, b).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].participant(b).unwrap().muted);
        assert!(ConversationRepository::list_for_user(&mut conn, outsider).await.unwrap().is_empty());
    }
}
