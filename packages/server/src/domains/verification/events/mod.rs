use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{AccountId, VerificationRequestId};
use crate::domains::verification::models::RequestStatus;

/// Verification events - FACT EVENTS ONLY
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationEvent {
    VerificationDecided {
        request_id: VerificationRequestId,
        artist_id: AccountId,
        reviewer_id: AccountId,
        status: RequestStatus,
        reason: Option<String>,
        decided_at: DateTime<Utc>,
    },
}

impl VerificationEvent {
    pub fn recipient(&self) -> AccountId {
        match self {
            VerificationEvent::VerificationDecided { artist_id, .. } => *artist_id,
        }
    }
}
