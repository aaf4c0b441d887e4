//! In-process implementation of [`SocialStore`].
//!
//! All state sits behind one mutex and every operation runs inside a single
//! critical section with no `.await`, so each call is atomic and a dropped
//! future can never leave half-applied state. Used by tests and local runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::common::{
    AccountId, Cursor, SocialError, SocialResult, VerificationRequestId, VerificationStatus,
};
use crate::domains::accounts::{Account, CountDrift};
use crate::domains::follows::data::FollowCounts;
use crate::domains::follows::models::{FollowDirection, FollowEdge, FollowListing};
use crate::domains::verification::models::{Decision, RequestStatus, VerificationRequest};
use crate::kernel::{EdgeWrite, SocialStore};

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    edges: HashMap<(AccountId, AccountId), DateTime<Utc>>,
    requests: HashMap<VerificationRequestId, VerificationRequest>,
    last_tick: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing microsecond timestamps, so listing order always
    /// matches write order.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = now.duration_trunc(Duration::microseconds(1)).unwrap_or(now);
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn require_account(&self, id: AccountId) -> SocialResult<&Account> {
        self.accounts
            .get(&id)
            .ok_or_else(|| SocialError::not_found("account", id))
    }

    fn require_pair(&self, follower_id: AccountId, followee_id: AccountId) -> SocialResult<()> {
        self.require_account(followee_id)?;
        self.require_account(follower_id)?;
        Ok(())
    }

    fn adjust_counts(&mut self, follower_id: AccountId, followee_id: AccountId, delta: i64) {
        if let Some(follower) = self.accounts.get_mut(&follower_id) {
            follower.following_count += delta;
        }
        if let Some(followee) = self.accounts.get_mut(&followee_id) {
            followee.follower_count += delta;
        }
    }

    fn edge_counts(&self, follower_id: AccountId, followee_id: AccountId) -> FollowCounts {
        FollowCounts {
            follower_count: self
                .accounts
                .get(&followee_id)
                .map(|a| a.follower_count)
                .unwrap_or(0),
            following_count: self
                .accounts
                .get(&follower_id)
                .map(|a| a.following_count)
                .unwrap_or(0),
        }
    }

    fn count_drift(&self) -> Vec<CountDrift> {
        let mut live_followers: HashMap<AccountId, i64> = HashMap::new();
        let mut live_following: HashMap<AccountId, i64> = HashMap::new();
        for (follower, followee) in self.edges.keys() {
            *live_following.entry(*follower).or_default() += 1;
            *live_followers.entry(*followee).or_default() += 1;
        }

        let mut drift: Vec<CountDrift> = self
            .accounts
            .values()
            .filter_map(|account| {
                let followers = live_followers.get(&account.id).copied().unwrap_or(0);
                let following = live_following.get(&account.id).copied().unwrap_or(0);
                (account.follower_count != followers || account.following_count != following)
                    .then(|| CountDrift {
                        account_id: account.id,
                        cached_followers: account.follower_count,
                        live_followers: followers,
                        cached_following: account.following_count,
                        live_following: following,
                    })
            })
            .collect();
        drift.sort_by_key(|d| d.account_id);
        drift
    }

    fn pending_for(&self, artist_id: AccountId) -> Option<&VerificationRequest> {
        self.requests
            .values()
            .find(|r| r.artist_id == artist_id && r.is_pending())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panic mid-operation cannot leave partial state; every mutation
        // completes before the guard is released.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Overwrite an account's cached counters. Lets tests simulate drift
    /// that reconciliation must repair.
    pub fn force_counts(&self, id: AccountId, follower_count: i64, following_count: i64) {
        if let Some(account) = self.state().accounts.get_mut(&id) {
            account.follower_count = follower_count;
            account.following_count = following_count;
        }
    }

    pub fn edge_count(&self) -> usize {
        self.state().edges.len()
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn provision_account(&self, account: &Account) -> SocialResult<Account> {
        let mut state = self.state();
        if state.accounts.contains_key(&account.id) {
            return Err(SocialError::conflict("account", account.id, "already provisioned"));
        }
        let mut account = account.clone();
        account.follower_count = 0;
        account.following_count = 0;
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account(&self, id: AccountId) -> SocialResult<Option<Account>> {
        Ok(self.state().accounts.get(&id).cloned())
    }

    async fn follow(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<EdgeWrite> {
        let mut state = self.state();
        state.require_pair(follower_id, followee_id)?;

        let key = (follower_id, followee_id);
        let changed = if state.edges.contains_key(&key) {
            None
        } else {
            let created_at = state.tick();
            state.edges.insert(key, created_at);
            state.adjust_counts(follower_id, followee_id, 1);
            Some(FollowEdge {
                follower_id,
                followee_id,
                created_at,
            })
        };

        Ok(EdgeWrite {
            changed,
            counts: state.edge_counts(follower_id, followee_id),
        })
    }

    async fn unfollow(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<EdgeWrite> {
        let mut state = self.state();
        state.require_pair(follower_id, followee_id)?;

        let changed = state
            .edges
            .remove(&(follower_id, followee_id))
            .map(|created_at| FollowEdge {
                follower_id,
                followee_id,
                created_at,
            });
        if changed.is_some() {
            state.adjust_counts(follower_id, followee_id, -1);
        }

        Ok(EdgeWrite {
            changed,
            counts: state.edge_counts(follower_id, followee_id),
        })
    }

    async fn edge_exists(
        &self,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> SocialResult<bool> {
        Ok(self.state().edges.contains_key(&(follower_id, followee_id)))
    }

    async fn list_edges(
        &self,
        user_id: AccountId,
        direction: FollowDirection,
        after: Option<&Cursor>,
        fetch_limit: i64,
    ) -> SocialResult<Vec<FollowListing>> {
        let state = self.state();

        let mut rows: Vec<FollowListing> = state
            .edges
            .iter()
            .filter_map(|(&(follower, followee), &created_at)| {
                let other = match direction {
                    FollowDirection::Followers if followee == user_id => follower,
                    FollowDirection::Following if follower == user_id => followee,
                    _ => return None,
                };
                let account = state.accounts.get(&other)?;
                Some(FollowListing {
                    account_id: other,
                    display_name: account.display_name.clone(),
                    followed_at: created_at,
                })
            })
            .filter(|row| after.map_or(true, |c| row.cursor() < *c))
            .collect();

        rows.sort_by(|a, b| b.cursor().cmp(&a.cursor()));
        rows.truncate(fetch_limit.max(0) as usize);
        Ok(rows)
    }

    async fn find_count_drift(&self) -> SocialResult<Vec<CountDrift>> {
        Ok(self.state().count_drift())
    }

    async fn repair_count_drift(&self) -> SocialResult<Vec<CountDrift>> {
        let mut state = self.state();
        let drift = state.count_drift();
        for row in &drift {
            if let Some(account) = state.accounts.get_mut(&row.account_id) {
                account.follower_count = row.live_followers;
                account.following_count = row.live_following;
            }
        }
        Ok(drift)
    }

    async fn submit_verification(
        &self,
        request: &VerificationRequest,
    ) -> SocialResult<VerificationRequest> {
        let mut state = self.state();
        let artist = state.require_account(request.artist_id)?;

        if let Some(open) = state.pending_for(artist.id) {
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

        let mut inserted = request.clone();
        inserted.status = RequestStatus::Pending;
        inserted.submitted_at = state.tick();
        state.requests.insert(inserted.id, inserted.clone());
        if let Some(artist) = state.accounts.get_mut(&inserted.artist_id) {
            artist.verification_status = VerificationStatus::Pending;
        }

        Ok(inserted)
    }

    async fn decide_verification(
        &self,
        request_id: VerificationRequestId,
        reviewer_id: AccountId,
        decision: Decision,
        reason: Option<&str>,
    ) -> SocialResult<VerificationRequest> {
        let mut state = self.state();
        let decided_at = state.tick();

        let request = state
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| SocialError::not_found("verification request", request_id))?;
        if !request.is_pending() {
            return Err(SocialError::conflict(
                "verification request",
                request_id,
                format!("already {}", request.status),
            ));
        }

        request.status = decision.request_status();
        request.reviewer_id = Some(reviewer_id);
        request.decided_at = Some(decided_at);
        request.reason = reason.map(str::to_string);
        let decided = request.clone();

        if let Some(artist) = state.accounts.get_mut(&decided.artist_id) {
            artist.verification_status = decision.account_status();
        }

        Ok(decided)
    }

    async fn latest_decision(
        &self,
        artist_id: AccountId,
    ) -> SocialResult<Option<VerificationRequest>> {
        Ok(self
            .state()
            .requests
            .values()
            .filter(|r| r.artist_id == artist_id && !r.is_pending())
            .max_by_key(|r| (r.decided_at, r.id))
            .cloned())
    }

    async fn list_pending(
        &self,
        after: Option<&Cursor>,
        fetch_limit: i64,
    ) -> SocialResult<Vec<VerificationRequest>> {
        let state = self.state();
        let mut rows: Vec<VerificationRequest> = state
            .requests
            .values()
            .filter(|r| r.is_pending())
            .filter(|r| after.map_or(true, |c| r.cursor() > *c))
            .cloned()
            .collect();

        rows.sort_by_key(|r| r.cursor());
        rows.truncate(fetch_limit.max(0) as usize);
        Ok(rows)
    }
}
