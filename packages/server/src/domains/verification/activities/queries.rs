use crate::common::auth::{Actor, Capability};
use crate::common::{within, AccountId, Caller, Page, PageRequest, SocialError, SocialResult};
use crate::domains::verification::data::{PendingRequest, VerificationStatusView};
use crate::domains::verification::models::VerificationRequest;
use crate::kernel::ServerDeps;

/// An artist's current status and most recent decision, if any.
pub async fn status(
    caller: &Caller,
    artist_id: AccountId,
    deps: &ServerDeps,
) -> SocialResult<VerificationStatusView> {
    within(deps.deadline_for(caller), "verification_status", async {
        let account = deps
            .store
            .find_account(artist_id)
            .await?
            .ok_or_else(|| SocialError::not_found("account", artist_id))?;
        let last_decision = deps.store.latest_decision(artist_id).await?;

        Ok::<_, SocialError>(VerificationStatusView {
            verification_status: account.verification_status,
            last_decision: last_decision.map(Into::into),
        })
    })
    .await
}

/// The moderation queue, oldest submission first. Admin only.
pub async fn list_pending(
    caller: &Caller,
    page: &PageRequest,
    deps: &ServerDeps,
) -> SocialResult<Page<PendingRequest>> {
    let page = page.validate()?;

    let rows = within(deps.deadline_for(caller), "list_pending", async {
        Actor::new(caller)
            .can(Capability::ViewModerationQueue)
            .check(deps.store.as_ref())
            .await?;
        deps.store
            .list_pending(page.cursor.as_ref(), page.fetch_limit())
            .await
    })
    .await?;

    Ok(Page::from_rows(rows, &page, VerificationRequest::cursor).map(PendingRequest::from))
}
