//! FollowGraphService - the follow graph's public surface.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::common::{AccountId, Caller, Page, PageRequest, SocialError, SocialResult};
use crate::domains::follows::activities;
use crate::domains::follows::data::{AccountSummary, FollowCounts, Relationship};
use crate::domains::follows::models::FollowDirection;
use crate::kernel::ServerDeps;

/// Cloneable handle over the shared deps; every clone talks to the same store.
#[derive(Clone)]
pub struct FollowGraphService {
    deps: ServerDeps,
}

impl FollowGraphService {
    pub fn new(deps: ServerDeps) -> Self {
        Self { deps }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    pub async fn follow(&self, caller: &Caller, followee_id: AccountId) -> SocialResult<FollowCounts> {
        activities::follow(caller, followee_id, &self.deps).await
    }

    pub async fn unfollow(
        &self,
        caller: &Caller,
        followee_id: AccountId,
    ) -> SocialResult<FollowCounts> {
        activities::unfollow(caller, followee_id, &self.deps).await
    }

    /// Accounts `user_id` follows, most recent first.
    pub async fn list_following(
        &self,
        caller: &Caller,
        user_id: AccountId,
        page: &PageRequest,
    ) -> SocialResult<Page<AccountSummary>> {
        activities::list_follows(caller, user_id, FollowDirection::Following, page, &self.deps)
            .await
    }

    /// Accounts following `user_id`, most recent first.
    pub async fn list_followers(
        &self,
        caller: &Caller,
        user_id: AccountId,
        page: &PageRequest,
    ) -> SocialResult<Page<AccountSummary>> {
        activities::list_follows(caller, user_id, FollowDirection::Followers, page, &self.deps)
            .await
    }

    pub async fn counts(&self, caller: &Caller, account_id: AccountId) -> SocialResult<FollowCounts> {
        activities::counts(caller, account_id, &self.deps).await
    }

    pub async fn relationship(
        &self,
        caller: &Caller,
        a: AccountId,
        b: AccountId,
    ) -> SocialResult<Relationship> {
        activities::relationship(caller, a, b, &self.deps).await
    }

    /// Every follower of `user_id`, fetched a page at a time as the stream is
    /// polled. Ends after the last page; stops at the first error.
    pub fn followers_stream(
        &self,
        caller: Caller,
        user_id: AccountId,
        page_size: Option<i32>,
    ) -> BoxStream<'static, SocialResult<AccountSummary>> {
        self.edge_stream(caller, user_id, FollowDirection::Followers, page_size)
    }

    /// Every account `user_id` follows, lazily paged.
    pub fn following_stream(
        &self,
        caller: Caller,
        user_id: AccountId,
        page_size: Option<i32>,
    ) -> BoxStream<'static, SocialResult<AccountSummary>> {
        self.edge_stream(caller, user_id, FollowDirection::Following, page_size)
    }

    fn edge_stream(
        &self,
        caller: Caller,
        user_id: AccountId,
        direction: FollowDirection,
        page_size: Option<i32>,
    ) -> BoxStream<'static, SocialResult<AccountSummary>> {
        let deps = self.deps.clone();

        // State: `Some(cursor)` while there are pages left, `None` once done.
        stream::try_unfold(Some(None::<String>), move |state| {
            let deps = deps.clone();
            let caller = caller.clone();
            async move {
                match state {
                    Some(cursor) => {
                        next_page(&deps, &caller, user_id, direction, cursor, page_size).await
                    }
                    None => Ok(None),
                }
            }
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, SocialError>)))
        .try_flatten()
        .boxed()
    }
}

type PageStep = Option<(Vec<AccountSummary>, Option<Option<String>>)>;

async fn next_page(
    deps: &ServerDeps,
    caller: &Caller,
    user_id: AccountId,
    direction: FollowDirection,
    cursor: Option<String>,
    page_size: Option<i32>,
) -> SocialResult<PageStep> {
    let request = PageRequest::new(cursor, page_size);
    let page = activities::list_follows(caller, user_id, direction, &request, deps).await?;

    if page.items.is_empty() {
        return Ok(None);
    }
    Ok(Some((page.items, page.next_cursor.map(Some))))
}
