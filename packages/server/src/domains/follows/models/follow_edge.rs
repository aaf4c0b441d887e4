use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

use crate::common::{AccountId, Cursor};

/// Directed "follower observes followee" relationship.
///
/// At most one row per ordered pair (primary key), never a self-edge
/// (check constraint). Edges are inserted or deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub follower_id: AccountId,
    pub followee_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Which side of the edge a listing walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowDirection {
    /// Accounts that follow the user
    Followers,
    /// Accounts the user follows
    Following,
}

/// One row of a followers/following listing.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FollowListing {
    pub account_id: AccountId,
    pub display_name: String,
    pub followed_at: DateTime<Utc>,
}

impl FollowListing {
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.followed_at, self.account_id.into_uuid())
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl FollowEdge {
    /// Insert the edge unless it already exists.
    ///
    /// Returns `None` when the edge was already there; a concurrent insert of
    /// the same pair waits on the primary key and then lands here as well.
    pub async fn insert_if_absent(
        follower_id: AccountId,
        followee_id: AccountId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO follow_edges (follower_id, followee_id)
             VALUES ($1, $2)
             ON CONFLICT (follower_id, followee_id) DO NOTHING
             RETURNING *",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(conn)
        .await
    }

    /// Delete the edge if present, returning it.
    pub async fn delete(
        follower_id: AccountId,
        followee_id: AccountId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "DELETE FROM follow_edges
             WHERE follower_id = $1 AND followee_id = $2
             RETURNING *",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(conn)
        .await
    }

    pub async fn exists<'e>(
        follower_id: AccountId,
        followee_id: AccountId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follow_edges WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(executor)
        .await
    }

    /// Keyset page of edges around `user_id`, most recent first.
    pub async fn find_page<'e>(
        user_id: AccountId,
        direction: FollowDirection,
        after: Option<&Cursor>,
        fetch_limit: i64,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Vec<FollowListing>> {
        let sql = match direction {
            FollowDirection::Followers => {
                r#"
                SELECT e.follower_id AS account_id, a.display_name, e.created_at AS followed_at
                FROM follow_edges e
                JOIN accounts a ON a.id = e.follower_id
                WHERE e.followee_id = $1
                  AND ($2::timestamptz IS NULL OR (e.created_at, e.follower_id) < ($2, $3::uuid))
                ORDER BY e.created_at DESC, e.follower_id DESC
                LIMIT $4
                "#
            }
            FollowDirection::Following => {
                r#"
                SELECT e.followee_id AS account_id, a.display_name, e.created_at AS followed_at
                FROM follow_edges e
                JOIN accounts a ON a.id = e.followee_id
                WHERE e.follower_id = $1
                  AND ($2::timestamptz IS NULL OR (e.created_at, e.followee_id) < ($2, $3::uuid))
                ORDER BY e.created_at DESC, e.followee_id DESC
                LIMIT $4
                "#
            }
        };

        sqlx::query_as::<_, FollowListing>(sql)
            .bind(user_id)
            .bind(after.map(|c| c.at))
            .bind(after.map(|c| c.id))
            .bind(fetch_limit)
            .fetch_all(executor)
            .await
    }
}
