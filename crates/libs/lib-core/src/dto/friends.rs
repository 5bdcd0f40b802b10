//! # Friend DTOs

use crate::model::store::models::{FriendState, UserSummary};
use serde::{Deserialize, Serialize};

/// Response of `GET /api/friends`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendsListResponse {
    pub friends: Vec<UserSummary>,
    pub sent_requests: Vec<UserSummary>,
    pub received_requests: Vec<UserSummary>,
}

/// Outcome of a friend transition: the relationship with `user_id` afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendActionResponse {
    pub user_id: i64,
    pub state: FriendState,
}
