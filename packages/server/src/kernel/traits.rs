// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Validation and authorization live in the domain activities that use them.
//
// Naming convention: Base* for collaborator traits (e.g., BaseNotificationEmitter)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{AccountId, Cursor, SocialResult, VerificationRequestId};
use crate::domains::accounts::{Account, CountDrift};
use crate::domains::follows::data::FollowCounts;
use crate::domains::follows::models::{FollowDirection, FollowEdge, FollowListing};
use crate::domains::verification::models::{Decision, VerificationRequest};
use crate::kernel::notifications::SocialEvent;

// =============================================================================
// Persistence contract
// =============================================================================

/// Outcome of a follow or unfollow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeWrite {
    /// The edge that was created or removed; `None` when the call was a no-op.
    pub changed: Option<FollowEdge>,
    /// Counts as of the end of the same unit of work.
    pub counts: FollowCounts,
}

/// Durable storage for the follow graph and verification requests.
///
/// Every mutating method is one atomic unit of work: the edge and its two
/// counters, or the request and its artist's status, change together or not
/// at all. Dropping a call mid-flight must leave no partial state.
#[async_trait]
pub trait SocialStore: Send + Sync {
    // ---- accounts (provisioned by the identity layer) ----

    async fn provision_account(&self, account: &Account) -> SocialResult<Account>;

    async fn find_account(&self, id: AccountId) -> SocialResult<Option<Account>>;

    // ---- follow graph ----

    /// Create the edge if absent. Fails `NotFound` if either account is
    /// missing. A duplicate is success with `changed: None`.
    async fn follow(&self, follower_id: AccountId, followee_id: AccountId)
        -> SocialResult<EdgeWrite>;

    /// Remove the edge if present. Absence is success with `changed: None`.
    async fn unfollow(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<EdgeWrite>;

    async fn edge_exists(&self, follower_id: AccountId, followee_id: AccountId)
        -> SocialResult<bool>;

    /// Up to `fetch_limit` listings strictly after `after`, most recent first.
    async fn list_edges(
        &self,
        user_id: AccountId,
        direction: FollowDirection,
        after: Option<&Cursor>,
        fetch_limit: i64,
    ) -> SocialResult<Vec<FollowListing>>;

    async fn find_count_drift(&self) -> SocialResult<Vec<CountDrift>>;

    /// Recount drifted accounts from the edge set. Returns what was fixed.
    async fn repair_count_drift(&self) -> SocialResult<Vec<CountDrift>>;

    // ---- verification ----

    /// Insert a pending request and mark the artist `Pending`.
    ///
    /// Fails `NotFound` for an unknown artist and `Conflict` if the artist
    /// already has a pending request or is verified.
    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> SocialResult<VerificationRequest>;

    /// Decide a pending request and mirror the result onto the artist.
    ///
    /// Fails `NotFound` for an unknown request and `Conflict` if it is no
    /// longer pending.
    async fn decide_verification(
        &self,
        request_id: VerificationRequestId,
        reviewer_id: AccountId,
        decision: Decision,
        reason: Option<&str>,
    ) -> SocialResult<VerificationRequest>;

    async fn latest_decision(&self, artist_id: AccountId)
        -> SocialResult<Option<VerificationRequest>>;

    /// Up to `fetch_limit` pending requests after `after`, oldest first.
    async fn list_pending(
        &self,
        after: Option<&Cursor>,
        fetch_limit: i64,
    ) -> SocialResult<Vec<VerificationRequest>>;
}

// =============================================================================
// Notification Trait (Infrastructure)
// =============================================================================

/// Downstream delivery of domain events.
///
/// Called after commit. Failures are logged by the caller and never undo or
/// fail the operation that produced the event.
#[async_trait]
pub trait BaseNotificationEmitter: Send + Sync {
    async fn emit(&self, event: SocialEvent) -> Result<()>;
}
