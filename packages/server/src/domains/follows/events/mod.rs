use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::AccountId;

/// Follow graph events - FACT EVENTS ONLY
///
/// Emitted after the edge has been committed. Repeated follows of an
/// existing edge emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FollowEvent {
    NewFollower {
        follower_id: AccountId,
        followee_id: AccountId,
        followed_at: DateTime<Utc>,
    },
}

impl FollowEvent {
    /// The account that should hear about this event.
    pub fn recipient(&self) -> AccountId {
        match self {
            FollowEvent::NewFollower { followee_id, .. } => *followee_id,
        }
    }
}
