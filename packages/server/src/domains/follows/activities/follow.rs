//! Follow and unfollow.
//!
//! Both are idempotent and safe to retry blindly: a repeated follow or an
//! unfollow of a missing edge succeeds without touching the counters.

use tracing::{debug, info};

use crate::common::auth::{Actor, Capability};
use crate::common::{within, AccountId, Caller, SocialError, SocialResult};
use crate::domains::follows::data::FollowCounts;
use crate::domains::follows::events::FollowEvent;
use crate::kernel::{emit_after_commit, ServerDeps};

/// Make the caller follow `followee_id`.
///
/// Returns the followee's follower count and the caller's following count.
/// `NewFollower` is emitted only when an edge was actually created.
pub async fn follow(
    caller: &Caller,
    followee_id: AccountId,
    deps: &ServerDeps,
) -> SocialResult<FollowCounts> {
    let follower_id = caller.account_id;
    if follower_id == followee_id {
        return Err(SocialError::invalid("an account cannot follow itself"));
    }

    let write = within(deps.deadline_for(caller), "follow", async {
        Actor::new(caller)
            .can(Capability::FollowAccounts)
            .check(deps.store.as_ref())
            .await?;
        deps.store.follow(follower_id, followee_id).await
    })
    .await?;

    match write.changed {
        Some(edge) => {
            info!(%follower_id, %followee_id, "Follow edge created");
            emit_after_commit(
                deps.notifier.as_ref(),
                FollowEvent::NewFollower {
                    follower_id,
                    followee_id,
                    followed_at: edge.created_at,
                },
            )
            .await;
        }
        None => debug!(%follower_id, %followee_id, "Already following"),
    }

    Ok(write.counts)
}

/// Remove the caller's edge to `followee_id`, if any.
pub async fn unfollow(
    caller: &Caller,
    followee_id: AccountId,
    deps: &ServerDeps,
) -> SocialResult<FollowCounts> {
    let follower_id = caller.account_id;
    if follower_id == followee_id {
        return Err(SocialError::invalid("an account cannot unfollow itself"));
    }

    let write = within(deps.deadline_for(caller), "unfollow", async {
        Actor::new(caller)
            .can(Capability::FollowAccounts)
            .check(deps.store.as_ref())
            .await?;
        deps.store.unfollow(follower_id, followee_id).await
    })
    .await?;

    if write.changed.is_some() {
        info!(%follower_id, %followee_id, "Follow edge removed");
    } else {
        debug!(%follower_id, %followee_id, "No edge to remove");
    }

    Ok(write.counts)
}
