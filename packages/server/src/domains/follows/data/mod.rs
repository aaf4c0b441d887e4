use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::AccountId;
use crate::domains::follows::models::FollowListing;

/// Counts returned by follow/unfollow.
///
/// `follower_count` belongs to the followee, `following_count` to the
/// follower. When asked about a single account both refer to that account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCounts {
    pub follower_count: i64,
    pub following_count: i64,
}

/// Entry in a followers/following listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_id: AccountId,
    pub display_name: String,
    pub followed_at: DateTime<Utc>,
}

impl From<FollowListing> for AccountSummary {
    fn from(row: FollowListing) -> Self {
        Self {
            account_id: row.account_id,
            display_name: row.display_name,
            followed_at: row.followed_at,
        }
    }
}

/// Edges between two accounts, seen from the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub following: bool,
    pub followed_by: bool,
}
