//! PostgreSQL implementation of [`SocialStore`].
//!
//! Each mutating call is one transaction. Invariants are held by the schema
//! (primary key on follow pairs, partial unique index on pending requests);
//! the transaction code here only decides how a violation is reported.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use crate::common::{
    AccountId, Cursor, SocialError, SocialResult, VerificationRequestId, VerificationStatus,
};
use crate::domains::accounts::{Account, CountDrift};
use crate::domains::follows::data::FollowCounts;
use crate::domains::follows::models::{FollowDirection, FollowEdge, FollowListing};
use crate::domains::verification::models::{Decision, VerificationRequest};
use crate::kernel::{EdgeWrite, SocialStore};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> SocialResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Both ends of an edge must exist; report the first missing one.
fn missing_endpoint(
    locked: &[AccountId],
    follower_id: AccountId,
    followee_id: AccountId,
) -> Option<SocialError> {
    [followee_id, follower_id]
        .into_iter()
        .find(|id| !locked.contains(id))
        .map(|id| SocialError::not_found("account", id))
}

#[async_trait]
impl SocialStore for PostgresStore {
    async fn provision_account(&self, account: &Account) -> SocialResult<Account> {
        account.insert(&self.pool).await.map_err(|e| {
            if is_unique_violation(&e) {
                SocialError::conflict("account", account.id, "already provisioned")
            } else {
                e.into()
            }
        })
    }

    async fn find_account(&self, id: AccountId) -> SocialResult<Option<Account>> {
        Ok(Account::find_by_id(id, &self.pool).await?)
    }

    #[instrument(skip_all, fields(%follower_id, %followee_id))]
    async fn follow(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<EdgeWrite> {
        let mut tx = self.pool.begin().await?;

        let locked = Account::lock_pair(follower_id, followee_id, &mut tx).await?;
        if let Some(err) = missing_endpoint(&locked, follower_id, followee_id) {
            return Err(err);
        }

        let created = FollowEdge::insert_if_absent(follower_id, followee_id, &mut tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    SocialError::not_found("account", followee_id)
                } else {
                    e.into()
                }
            })?;

        if created.is_some() {
            Account::adjust_follow_counts(follower_id, followee_id, 1, &mut tx).await?;
        } else {
            debug!("Edge already present, nothing to do");
        }

        let (follower_count, following_count) =
            Account::edge_counts(follower_id, followee_id, &mut *tx).await?;
        tx.commit().await?;

        Ok(EdgeWrite {
            changed: created,
            counts: FollowCounts {
                follower_count,
                following_count,
            },
        })
    }

    #[instrument(skip_all, fields(%follower_id, %followee_id))]
    async fn unfollow(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<EdgeWrite> {
        let mut tx = self.pool.begin().await?;

        let locked = Account::lock_pair(follower_id, followee_id, &mut tx).await?;
        if let Some(err) = missing_endpoint(&locked, follower_id, followee_id) {
            return Err(err);
        }

        let removed = FollowEdge::delete(follower_id, followee_id, &mut tx).await?;
        if removed.is_some() {
            Account::adjust_follow_counts(follower_id, followee_id, -1, &mut tx).await?;
        }

        let (follower_count, following_count) =
            Account::edge_counts(follower_id, followee_id, &mut *tx).await?;
        tx.commit().await?;

        Ok(EdgeWrite {
            changed: removed,
            counts: FollowCounts {
                follower_count,
                following_count,
            },
        })
    }

    async fn edge_exists(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<bool> {
        Ok(FollowEdge::exists(follower_id, followee_id, &self.pool).await?)
    }

    async fn list_edges(
        &self,
        user_id: AccountId,
        direction: FollowDirection,
        after: Option<&Cursor>,
        fetch_limit: i64,
    ) -> SocialResult<Vec<FollowListing>> {
        Ok(FollowEdge::find_page(user_id, direction, after, fetch_limit, &self.pool).await?)
    }

    async fn find_count_drift(&self) -> SocialResult<Vec<CountDrift>> {
        Ok(Account::find_count_drift(&self.pool).await?)
    }

    async fn repair_count_drift(&self) -> SocialResult<Vec<CountDrift>> {
        let mut tx = self.pool.begin().await?;
        let repaired = Account::repair_count_drift(&mut tx).await?;
        tx.commit().await?;
        Ok(repaired)
    }

    #[instrument(skip_all, fields(artist_id = %request.artist_id))]
    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> SocialResult<VerificationRequest> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent submits for the same artist.
        let artist = Account::lock(request.artist_id, &mut tx)
            .await?
            .ok_or_else(|| SocialError::not_found("account", request.artist_id))?;

        if let Some(open) =
            VerificationRequest::find_pending_for_artist(artist.id, &mut *tx).await?
        {
            return Err(SocialError::conflict(
                "verification request",
                open.id,
                format!("artist {} already has a pending request", artist.id),
            ));
        }
        if !artist.verification_status.can_submit() {
            return Err(SocialError::conflict(
                "account",
                artist.id,
                format!("cannot submit while {}", artist.verification_status),
            ));
        }

        let inserted = request.insert(&mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                SocialError::conflict(
                    "account",
                    request.artist_id,
                    "artist already has a pending request",
                )
            } else {
                e.into()
            }
        })?;

        Account::set_verification_status(artist.id, VerificationStatus::Pending, &mut tx).await?;
        tx.commit().await?;

        Ok(inserted)
    }

    #[instrument(skip_all, fields(%request_id, %reviewer_id, ?decision))]
    async fn decide_verification(
        &self,
        request_id: VerificationRequestId,
        reviewer_id: AccountId,
        decision: Decision,
        reason: Option<&str>,
    ) -> SocialResult<VerificationRequest> {
        let mut tx = self.pool.begin().await?;

        let decided = VerificationRequest::decide(
            request_id,
            decision.request_status(),
            reviewer_id,
            reason,
            &mut tx,
        )
        .await?;

        let Some(decided) = decided else {
            // Lost the race, or never existed.
            return match VerificationRequest::find_by_id(request_id, &mut *tx).await? {
                Some(existing) => Err(SocialError::conflict(
                    "verification request",
                    request_id,
                    format!("already {}", existing.status),
                )),
                None => Err(SocialError::not_found("verification request", request_id)),
            };
        };

        Account::set_verification_status(decided.artist_id, decision.account_status(), &mut tx)
            .await?;
        tx.commit().await?;

        Ok(decided)
    }

    async fn latest_decision(
        &self,
        artist_id: AccountId,
    ) -> SocialResult<Option<VerificationRequest>> {
        Ok(VerificationRequest::find_latest_decided(artist_id, &self.pool).await?)
    }

    async fn list_pending(
        &self,
        after: Option<&Cursor>,
        fetch_limit: i64,
    ) -> SocialResult<Vec<VerificationRequest>> {
        Ok(VerificationRequest::find_pending_page(after, fetch_limit, &self.pool).await?)
    }
}
