//! Read-side follow graph queries.

use crate::common::{within, AccountId, Caller, Page, PageRequest, SocialError, SocialResult};
use crate::domains::follows::data::{AccountSummary, FollowCounts, Relationship};
use crate::domains::follows::models::{FollowDirection, FollowListing};
use crate::kernel::ServerDeps;

/// One page of a user's followers or followees, most recent edge first.
///
/// Fails `NotFound` for an unknown user and `InvalidOperation` for a cursor
/// this crate did not issue.
pub async fn list_follows(
    caller: &Caller,
    user_id: AccountId,
    direction: FollowDirection,
    page: &PageRequest,
    deps: &ServerDeps,
) -> SocialResult<Page<AccountSummary>> {
    let page = page.validate()?;

    let rows = within(deps.deadline_for(caller), "list_follows", async {
        if deps.store.find_account(user_id).await?.is_none() {
            return Err(SocialError::not_found("account", user_id));
        }
        deps.store
            .list_edges(user_id, direction, page.cursor.as_ref(), page.fetch_limit())
            .await
    })
    .await?;

    Ok(Page::from_rows(rows, &page, FollowListing::cursor).map(AccountSummary::from))
}

/// Current follower and following counts for one account.
pub async fn counts(
    caller: &Caller,
    account_id: AccountId,
    deps: &ServerDeps,
) -> SocialResult<FollowCounts> {
    let account = within(deps.deadline_for(caller), "counts", deps.store.find_account(account_id))
        .await?
        .ok_or_else(|| SocialError::not_found("account", account_id))?;

    Ok(FollowCounts {
        follower_count: account.follower_count,
        following_count: account.following_count,
    })
}

/// Whether `a` follows `b` and whether `b` follows `a`.
pub async fn relationship(
    caller: &Caller,
    a: AccountId,
    b: AccountId,
    deps: &ServerDeps,
) -> SocialResult<Relationship> {
    within(deps.deadline_for(caller), "relationship", async {
        for id in [a, b] {
            if deps.store.find_account(id).await?.is_none() {
                return Err(SocialError::not_found("account", id));
            }
        }
        Ok::<_, SocialError>(Relationship {
            following: deps.store.edge_exists(a, b).await?,
            followed_by: deps.store.edge_exists(b, a).await?,
        })
    })
    .await
}
