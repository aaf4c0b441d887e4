use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::{within, Caller, SocialError, SocialResult, VerificationRequestId};
use crate::domains::verification::data::DecisionRecord;
use crate::domains::verification::events::VerificationEvent;
use crate::domains::verification::models::Decision;
use crate::kernel::{emit_after_commit, ServerDeps};

/// Reason to store with a decision. Rejections must say why; approvals
/// never carry one.
fn decision_reason(decision: Decision, reason: Option<&str>) -> SocialResult<Option<&str>> {
    match decision {
        Decision::Approve => Ok(None),
        Decision::Reject => reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(Some)
            .ok_or_else(|| SocialError::invalid("a rejection requires a reason")),
    }
}

/// Approve or reject a pending request as the calling admin.
///
/// Of several concurrent decisions on one request exactly one succeeds; the
/// rest fail `Conflict` and leave the first decision in place.
pub async fn decide(
    caller: &Caller,
    request_id: VerificationRequestId,
    decision: Decision,
    reason: Option<&str>,
    deps: &ServerDeps,
) -> SocialResult<DecisionRecord> {
    let deadline = deps.deadline_for(caller);

    let reviewer_id = within(deadline, "decide_verification", async {
        Actor::new(caller)
            .can(Capability::DecideVerification)
            .check(deps.store.as_ref())
            .await
            .map_err(SocialError::from)
    })
    .await?;

    let reason = decision_reason(decision, reason)?;

    let decided = within(
        deadline,
        "decide_verification",
        deps.store
            .decide_verification(request_id, reviewer_id, decision, reason),
    )
    .await?;

    info!(
        %request_id,
        %reviewer_id,
        artist_id = %decided.artist_id,
        status = %decided.status,
        "Verification request decided"
    );

    if let Some(decided_at) = decided.decided_at {
        emit_after_commit(
            deps.notifier.as_ref(),
            VerificationEvent::VerificationDecided {
                request_id: decided.id,
                artist_id: decided.artist_id,
                reviewer_id,
                status: decided.status,
                reason: decided.reason.clone(),
                decided_at,
            },
        )
        .await;
    }

    Ok(decided.into())
}
