//! # Friend Service
//!
//! The request workflow between two users:
//!
//! ```text
//! none ──send──▶ request-sent(A→B) ──accept──▶ friends
//!   ▲                 │    │                      │
//!   └────cancel───────┘    └──reject──▶ none      └──unfriend──▶ none
//! ```
//!
//! Each transition and the notifications it produces commit together.

use lib_core::dto::{FriendActionResponse, FriendsListResponse};
use lib_core::model::store::models::{
    FriendState, FriendStatus, NotificationForCreate, NotificationKind, UserSummary,
};
use lib_core::model::store::{FriendRepository, NotificationRepository, UserRepository};
use lib_core::{AppError, DbPool, Result};
use sqlx::SqliteConnection;
use tracing::{info, instrument};

pub struct FriendService {
    db: DbPool,
}

impl FriendService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i64) -> Result<FriendsListResponse> {
        let mut conn = self.db.acquire().await?;

        Ok(FriendsListResponse {
            friends: FriendRepository::friends_of(&mut *conn, user_id).await?,
            sent_requests: FriendRepository::sent_requests(&mut *conn, user_id).await?,
            received_requests: FriendRepository::received_requests(&mut *conn, user_id).await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn send_request(&self, sender_id: i64, receiver_id: i64) -> Result<FriendActionResponse> {
        if sender_id == receiver_id {
            return Err(AppError::InvalidInput(
                "You cannot send a friend request to yourself.".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let sender = existing_user(&mut tx, sender_id).await?;
        existing_user(&mut tx, receiver_id).await?;

        if let Some(existing) = FriendRepository::find_between(&mut *tx, sender_id, receiver_id).await? {
            let reason = match existing.status {
                FriendStatus::Accepted => "Already friends.",
                FriendStatus::Pending if existing.sender_id == sender_id => "Request already sent.",
                FriendStatus::Pending => "This user has already sent you a request.",
            };
            return Err(AppError::Conflict(reason.to_string()));
        }

        FriendRepository::create_request(&mut *tx, sender_id, receiver_id).await?;
        NotificationRepository::create(
            &mut *tx,
            &NotificationForCreate::new(
                receiver_id,
                "Friend request",
                format!("{} sent you a friend request", sender.username),
                NotificationKind::FriendRequest { sender_id },
            )
            .link("/friends"),
        )
        .await?;

        tx.commit().await?;

        info!("Friend request sent");
        Ok(FriendActionResponse {
            user_id: receiver_id,
            state: FriendState::RequestSent,
        })
    }

    /// Withdraw a pending request and the notification it produced.
    #[instrument(skip(self))]
    pub async fn cancel_request(&self, sender_id: i64, receiver_id: i64) -> Result<FriendActionResponse> {
        let mut tx = self.db.begin().await?;

        let request = FriendRepository::find_pending(&mut *tx, sender_id, receiver_id)
            .await?
            .ok_or_else(request_not_found)?;

        FriendRepository::delete(&mut *tx, request.id).await?;
        NotificationRepository::delete_friend_request(&mut *tx, receiver_id, sender_id).await?;

        tx.commit().await?;

        info!("Friend request cancelled");
        Ok(FriendActionResponse {
            user_id: receiver_id,
            state: FriendState::None,
        })
    }

    /// `receiver_id` accepts the pending request from `sender_id`.
    #[instrument(skip(self))]
    pub async fn accept_request(&self, receiver_id: i64, sender_id: i64) -> Result<FriendActionResponse> {
        let mut tx = self.db.begin().await?;

        let request = FriendRepository::find_pending(&mut *tx, sender_id, receiver_id)
            .await?
            .ok_or_else(request_not_found)?;
        let receiver = existing_user(&mut tx, receiver_id).await?;

        FriendRepository::accept(&mut *tx, request.id).await?;
        NotificationRepository::mark_friend_request_read(&mut *tx, receiver_id, sender_id).await?;
        NotificationRepository::create(
            &mut *tx,
            &NotificationForCreate::new(
                sender_id,
                "Friend request accepted",
                format!("{} accepted your friend request", receiver.username),
                NotificationKind::FriendRequestAccepted { user_id: receiver_id },
            )
            .link("/friends"),
        )
        .await?;

        tx.commit().await?;

        info!("Friend request accepted");
        Ok(FriendActionResponse {
            user_id: sender_id,
            state: FriendState::Friends,
        })
    }

    /// `receiver_id` declines the pending request from `sender_id`.
    #[instrument(skip(self))]
    pub async fn reject_request(&self, receiver_id: i64, sender_id: i64) -> Result<FriendActionResponse> {
        let mut tx = self.db.begin().await?;

        let request = FriendRepository::find_pending(&mut *tx, sender_id, receiver_id)
            .await?
            .ok_or_else(request_not_found)?;
        let receiver = existing_user(&mut tx, receiver_id).await?;

        FriendRepository::delete(&mut *tx, request.id).await?;
        NotificationRepository::mark_friend_request_read(&mut *tx, receiver_id, sender_id).await?;
        NotificationRepository::create(
            &mut *tx,
            &NotificationForCreate::new(
                sender_id,
                "Friend request declined",
                format!("{} declined your friend request", receiver.username),
                NotificationKind::FriendRequestRejected { user_id: receiver_id },
            ),
        )
        .await?;

        tx.commit().await?;

        info!("Friend request rejected");
        Ok(FriendActionResponse {
            user_id: sender_id,
            state: FriendState::None,
        })
    }

    #[instrument(skip(self))]
    pub async fn unfriend(&self, user_id: i64, friend_id: i64) -> Result<FriendActionResponse> {
        let mut tx = self.db.begin().await?;

        let friendship = FriendRepository::find_between(&mut *tx, user_id, friend_id)
            .await?
            .filter(|f| f.status == FriendStatus::Accepted)
            .ok_or_else(|| AppError::NotFound("You are not friends with this user.".to_string()))?;

        FriendRepository::delete(&mut *tx, friendship.id).await?;
        tx.commit().await?;

        info!("Unfriended");
        Ok(FriendActionResponse {
            user_id: friend_id,
            state: FriendState::None,
        })
    }
}

async fn existing_user(conn: &mut SqliteConnection, id: i64) -> Result<UserSummary> {
    UserRepository::find_summary(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

fn request_not_found() -> AppError {
    AppError::NotFound("Friend request not found.".to_string())
}
