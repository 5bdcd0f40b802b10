use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Declares a closed, text-backed enum stored as a lowercase string column.
///
/// Generates `as_str`, `Display`, `FromStr` and `TryFrom<String>` (for
/// `#[sqlx(try_from = "String")]`). Unknown strings fail to decode instead of
/// silently mapping to a default.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

// region: --- Users

text_enum! {
    /// Account role. Only admins may update the persisted app settings.
    UserRole { User => "user", Admin => "admin" }
}

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Public view of a user: safe to embed in any response.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

// endregion: --- Users

// region: --- Friend graph

text_enum! {
    /// A friendship row is either a pending request (sender → receiver) or accepted.
    FriendStatus { Pending => "pending", Accepted => "accepted" }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Friendship {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    #[sqlx(try_from = "String")]
    pub status: FriendStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Relationship between two users as seen from one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendState {
    None,
    /// The viewer sent a request that is still pending.
    RequestSent,
    /// The other user sent the viewer a request that is still pending.
    RequestReceived,
    Friends,
}

// endregion: --- Friend graph

// region: --- Conversations

text_enum! {
    ConversationType { Private => "private", Group => "group" }
}

text_enum! {
    ParticipantRole { Admin => "admin", Member => "member" }
}

/// Summary of the most recent message, denormalized onto the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LastMessage {
    pub message_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// A member of a conversation together with their unread counter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub user_id: i64,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub role: ParticipantRole,
    pub muted: bool,
    pub unread_count: i64,
}

/// Raw `conversations` row.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub conversation_type: ConversationType,
    pub name: Option<String>,
    pub image: Option<String>,
    pub last_message_id: Option<i64>,
    pub last_message_sender_id: Option<i64>,
    pub last_message_content: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub conversation_type: ConversationType,
    pub name: Option<String>,
    pub image: Option<String>,
    pub last_message: Option<LastMessage>,
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn from_parts(row: ConversationRow, participants: Vec<Participant>) -> Self {
        let last_message = match (
            row.last_message_id,
            row.last_message_sender_id,
            row.last_message_content,
            row.last_message_at,
        ) {
            (Some(message_id), Some(sender_id), Some(content), Some(sent_at)) => Some(LastMessage {
                message_id,
                sender_id,
                content,
                sent_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            conversation_type: row.conversation_type,
            name: row.name,
            image: row.image,
            last_message,
            participants,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    pub fn participant(&self, user_id: i64) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participant(user_id).is_some()
    }

    /// Unread counter of `user_id`; zero for non-participants.
    pub fn unread_for(&self, user_id: i64) -> i64 {
        self.participant(user_id).map(|p| p.unread_count).unwrap_or(0)
    }
}

// endregion: --- Conversations

// region: --- Messages

text_enum! {
    MessageType { Text => "text", Image => "image", File => "file", System => "system" }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Raw `messages` row; attachments are stored as a JSON array.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub message_type: MessageType,
    pub attachments: String,
    pub reply_to: Option<i64>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<i64>,
    /// Users who have read the message; always contains the sender.
    pub read_by: Vec<i64>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn from_row(row: MessageRow, read_by: Vec<i64>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            content: row.content,
            message_type: row.message_type,
            attachments: serde_json::from_str(&row.attachments)?,
            reply_to: row.reply_to,
            read_by,
            is_edited: row.is_edited,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub fn is_read_by(&self, user_id: i64) -> bool {
        self.read_by.contains(&user_id)
    }
}

// endregion: --- Messages

// region: --- Notifications

/// Closed set of notification kinds, each with its payload.
///
/// Stored as the `kind` tag column plus the full JSON in `payload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Message {
        conversation_id: i64,
        message_id: i64,
        sender_id: i64,
    },
    FriendRequest {
        sender_id: i64,
    },
    FriendRequestAccepted {
        user_id: i64,
    },
    FriendRequestRejected {
        user_id: i64,
    },
}

impl NotificationKind {
    pub fn tag(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Success => "success",
            NotificationKind::Message { .. } => "message",
            NotificationKind::FriendRequest { .. } => "friend_request",
            NotificationKind::FriendRequestAccepted { .. } => "friend_request_accepted",
            NotificationKind::FriendRequestRejected { .. } => "friend_request_rejected",
        }
    }

    /// Whether the client should offer accept/reject actions.
    pub fn is_actionable(&self) -> bool {
        matches!(self, NotificationKind::FriendRequest { .. })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub payload: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = serde_json::Error;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: serde_json::from_str(&row.payload)?,
            is_read: row.is_read,
            link: row.link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Data for inserting a notification.
#[derive(Debug, Clone)]
pub struct NotificationForCreate {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub link: Option<String>,
}

impl NotificationForCreate {
    pub fn new(user_id: i64, title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            link: None,
        }
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

// endregion: --- Notifications

// region: --- Settings

/// The single persisted settings record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    pub site_name: String,
    pub allow_registrations: bool,
    pub max_message_length: i64,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of [`AppSettings`]; only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsForUpdate {
    pub site_name: Option<String>,
    pub allow_registrations: Option<bool>,
    pub max_message_length: Option<i64>,
}

// endregion: --- Settings
