use crate::common::{AccountId, Caller, Page, PageRequest, SocialResult, VerificationRequestId};
use crate::domains::verification::activities;
use crate::domains::verification::data::{
    DecisionRecord, PendingRequest, SubmitReceipt, VerificationStatusView,
};
use crate::domains::verification::models::Decision;
use crate::kernel::ServerDeps;

/// Submit → review → decide lifecycle for the Verified badge.
#[derive(Clone)]
pub struct VerificationWorkflow {
    deps: ServerDeps,
}

impl VerificationWorkflow {
    pub fn new(deps: ServerDeps) -> Self {
        Self { deps }
    }

    pub async fn submit(&self, caller: &Caller, evidence_ref: &str) -> SocialResult<SubmitReceipt> {
        activities::submit(caller, evidence_ref, &self.deps).await
    }

    pub async fn decide(
        &self,
        caller: &Caller,
        request_id: VerificationRequestId,
        decision: Decision,
        reason: Option<&str>,
    ) -> SocialResult<DecisionRecord> {
        activities::decide(caller, request_id, decision, reason, &self.deps).await
    }

    pub async fn status(
        &self,
        caller: &Caller,
        artist_id: AccountId,
    ) -> SocialResult<VerificationStatusView> {
        activities::status(caller, artist_id, &self.deps).await
    }

    pub async fn list_pending(
        &self,
        caller: &Caller,
        page: &PageRequest,
    ) -> SocialResult<Page<PendingRequest>> {
        activities::list_pending(caller, page, &self.deps).await
    }
}
