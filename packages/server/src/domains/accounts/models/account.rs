use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

use crate::common::{AccountId, Role, VerificationStatus};

/// Account row as seen by this crate.
///
/// Provisioned by the identity layer. This crate only writes
/// `verification_status` and the two cached follow counters, and the counters
/// only ever change in the same transaction as the follow edge they count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub role: Role,
    pub display_name: String,
    pub verification_status: VerificationStatus,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Cached counters that disagree with the live edge set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CountDrift {
    pub account_id: AccountId,
    pub cached_followers: i64,
    pub live_followers: i64,
    pub cached_following: i64,
    pub live_following: i64,
}

impl Account {
    /// A fresh, unverified account with no edges.
    pub fn new(role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            role,
            display_name: display_name.into(),
            verification_status: VerificationStatus::Unverified,
            follower_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Account {
    pub async fn find_by_id<'e>(
        id: AccountId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Insert an account handed over by the identity layer.
    pub async fn insert<'e>(&self, executor: impl PgExecutor<'e>) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO accounts (id, role, display_name, verification_status, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(self.id)
        .bind(self.role)
        .bind(&self.display_name)
        .bind(self.verification_status)
        .bind(self.created_at)
        .fetch_one(executor)
        .await
    }

    /// Row-lock a single account for the rest of the transaction.
    pub async fn lock(id: AccountId, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Row-lock both ends of a follow edge, always in id order so that
    /// `follow(A, B)` and `follow(B, A)` cannot deadlock each other.
    ///
    /// Returns the ids that exist.
    pub async fn lock_pair(
        a: AccountId,
        b: AccountId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Vec<AccountId>> {
        sqlx::query_scalar::<_, AccountId>(
            "SELECT id FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![a, b])
        .fetch_all(conn)
        .await
    }

    /// Apply a follow-edge delta to both counters. Only call this from the
    /// transaction that inserted or deleted the edge.
    pub async fn adjust_follow_counts(
        follower_id: AccountId,
        followee_id: AccountId,
        delta: i64,
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE accounts SET following_count = following_count + $2 WHERE id = $1")
            .bind(follower_id)
            .bind(delta)
            .execute(&mut *conn)
            .await?;

        sqlx::query("UPDATE accounts SET follower_count = follower_count + $2 WHERE id = $1")
            .bind(followee_id)
            .bind(delta)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Followee's follower count and follower's following count, as one read.
    pub async fn edge_counts<'e>(
        follower_id: AccountId,
        followee_id: AccountId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT
                (SELECT follower_count FROM accounts WHERE id = $2),
                (SELECT following_count FROM accounts WHERE id = $1)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(executor)
        .await
    }

    pub async fn set_verification_status(
        id: AccountId,
        status: VerificationStatus,
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE accounts SET verification_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Accounts whose cached counters disagree with `follow_edges`.
    pub async fn find_count_drift<'e>(executor: impl PgExecutor<'e>) -> sqlx::Result<Vec<CountDrift>> {
        sqlx::query_as::<_, CountDrift>(
            r#"
            WITH live AS (
                SELECT
                    a.id,
                    a.follower_count,
                    a.following_count,
                    (SELECT COUNT(*) FROM follow_edges e WHERE e.followee_id = a.id) AS live_followers,
                    (SELECT COUNT(*) FROM follow_edges e WHERE e.follower_id = a.id) AS live_following
                FROM accounts a
            )
            SELECT
                id AS account_id,
                follower_count AS cached_followers,
                live_followers,
                following_count AS cached_following,
                live_following
            FROM live
            WHERE follower_count <> live_followers OR following_count <> live_following
            ORDER BY id
            "#,
        )
        .fetch_all(executor)
        .await
    }

    /// Overwrite drifted counters with the live edge counts.
    ///
    /// Account rows are locked in id order before the edge table, the same
    /// order `lock_pair` uses, so the recount waits out in-flight follows
    /// and then blocks new ones until it commits.
    pub async fn repair_count_drift(conn: &mut PgConnection) -> sqlx::Result<Vec<CountDrift>> {
        sqlx::query("SELECT id FROM accounts ORDER BY id FOR UPDATE")
            .execute(&mut *conn)
            .await?;
        sqlx::query("LOCK TABLE follow_edges IN SHARE MODE")
            .execute(&mut *conn)
            .await?;

        let drift = Self::find_count_drift(&mut *conn).await?;

        for row in &drift {
            sqlx::query(
                "UPDATE accounts SET follower_count = $2, following_count = $3 WHERE id = $1",
            )
            .bind(row.account_id)
            .bind(row.live_followers)
            .bind(row.live_following)
            .execute(&mut *conn)
            .await?;
        }

        Ok(drift)
    }
}
