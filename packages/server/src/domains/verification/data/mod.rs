use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AccountId, VerificationRequestId, VerificationStatus};
use crate::domains::verification::models::{RequestStatus, VerificationRequest};

/// Response to a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub request_id: VerificationRequestId,
    pub status: RequestStatus,
}

/// A decided (or, in the queue, still open) request as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub request_id: VerificationRequestId,
    pub status: RequestStatus,
    pub reviewer_id: Option<AccountId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl From<VerificationRequest> for DecisionRecord {
    fn from(request: VerificationRequest) -> Self {
        Self {
            request_id: request.id,
            status: request.status,
            reviewer_id: request.reviewer_id,
            decided_at: request.decided_at,
            reason: request.reason,
        }
    }
}

/// An artist's current standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatusView {
    pub verification_status: VerificationStatus,
    pub last_decision: Option<DecisionRecord>,
}

/// Moderation queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub request_id: VerificationRequestId,
    pub artist_id: AccountId,
    pub submitted_at: DateTime<Utc>,
    pub evidence_ref: String,
}

impl From<VerificationRequest> for PendingRequest {
    fn from(request: VerificationRequest) -> Self {
        Self {
            request_id: request.id,
            artist_id: request.artist_id,
            submitted_at: request.submitted_at,
            evidence_ref: request.evidence_ref,
        }
    }
}
