use chrono::Utc;
use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::{within, Caller, SocialError, SocialResult};
use crate::domains::verification::data::SubmitReceipt;
use crate::domains::verification::models::VerificationRequest;
use crate::kernel::ServerDeps;

/// Open a verification request for the calling artist.
///
/// The caller must be an `Artist` on record. Fails `Conflict` if a request is
/// already pending (that request is left untouched) or the artist is already
/// verified. Request creation and the move to `Pending` happen together.
pub async fn submit(
    caller: &Caller,
    evidence_ref: &str,
    deps: &ServerDeps,
) -> SocialResult<SubmitReceipt> {
    let evidence_ref = evidence_ref.trim();
    if evidence_ref.is_empty() {
        return Err(SocialError::invalid("evidence reference must not be empty"));
    }

    let request = within(deps.deadline_for(caller), "submit_verification", async {
        let artist_id = Actor::new(caller)
            .can(Capability::SubmitVerification)
            .check(deps.store.as_ref())
            .await?;

        deps.store
            .submit_verification(&VerificationRequest::pending(
                artist_id,
                evidence_ref,
                Utc::now(),
            ))
            .await
    })
    .await?;

    info!(
        request_id = %request.id,
        artist_id = %request.artist_id,
        "Verification request submitted"
    );

    Ok(SubmitReceipt {
        request_id: request.id,
        status: request.status,
    })
}
