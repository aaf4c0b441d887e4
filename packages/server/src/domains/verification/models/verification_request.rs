use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

use crate::common::{AccountId, Cursor, VerificationRequestId, VerificationStatus};
use crate::impl_text_enum;

/// An artist's request for the Verified badge.
///
/// Created `Pending` by submit; transitions exactly once to `Approved` or
/// `Rejected`. A partial unique index keeps one `Pending` row per artist.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationRequest {
    pub id: VerificationRequestId,
    pub artist_id: AccountId,
    pub submitted_at: DateTime<Utc>,
    pub evidence_ref: String,
    pub status: RequestStatus,
    pub reviewer_id: Option<AccountId>,
    pub decided_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl_text_enum!(RequestStatus, "request status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// A reviewer's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn request_status(&self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }

    pub fn account_status(&self) -> VerificationStatus {
        match self {
            Decision::Approve => VerificationStatus::Verified,
            Decision::Reject => VerificationStatus::Rejected,
        }
    }
}

impl VerificationRequest {
    pub fn pending(artist_id: AccountId, evidence_ref: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: VerificationRequestId::new(),
            artist_id,
            submitted_at,
            evidence_ref: evidence_ref.into(),
            status: RequestStatus::Pending,
            reviewer_id: None,
            decided_at: None,
            reason: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Queue position, oldest first.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.submitted_at, self.id.into_uuid())
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl VerificationRequest {
    pub async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO verification_requests (id, artist_id, evidence_ref, status)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(self.id)
        .bind(self.artist_id)
        .bind(&self.evidence_ref)
        .bind(self.status)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id<'e>(
        id: VerificationRequestId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM verification_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_pending_for_artist<'e>(
        artist_id: AccountId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM verification_requests WHERE artist_id = $1 AND status = 'pending'",
        )
        .bind(artist_id)
        .fetch_optional(executor)
        .await
    }

    /// Record a decision, guarded on the request still being pending.
    ///
    /// Returns `None` if the request is missing or was already decided; of
    /// two racing reviewers exactly one gets `Some`.
    pub async fn decide(
        id: VerificationRequestId,
        status: RequestStatus,
        reviewer_id: AccountId,
        reason: Option<&str>,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE verification_requests
            SET
                status = $2,
                reviewer_id = $3,
                decided_at = clock_timestamp(),
                reason = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .bind(reason)
        .fetch_optional(conn)
        .await
    }

    /// Most recently decided request for an artist.
    pub async fn find_latest_decided<'e>(
        artist_id: AccountId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM verification_requests
            WHERE artist_id = $1 AND status <> 'pending'
            ORDER BY decided_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(artist_id)
        .fetch_optional(executor)
        .await
    }

    /// Moderation queue page, oldest submission first.
    pub async fn find_pending_page<'e>(
        after: Option<&Cursor>,
        fetch_limit: i64,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM verification_requests
            WHERE status = 'pending'
              AND ($1::timestamptz IS NULL OR (submitted_at, id) > ($1, $2::uuid))
            ORDER BY submitted_at ASC, id ASC
            LIMIT $3
            "#,
        )
        .bind(after.map(|c| c.at))
        .bind(after.map(|c| c.id))
        .bind(fetch_limit)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_maps_to_statuses() {
        assert_eq!(Decision::Approve.request_status(), RequestStatus::Approved);
        assert_eq!(Decision::Approve.account_status(), VerificationStatus::Verified);
        assert_eq!(Decision::Reject.request_status(), RequestStatus::Rejected);
        assert_eq!(Decision::Reject.account_status(), VerificationStatus::Rejected);
    }

    #[test]
    fn test_pending_request_has_no_decision() {
        let request = VerificationRequest::pending(AccountId::new(), "portfolio-link", Utc::now());
        assert!(request.is_pending());
        assert!(request.reviewer_id.is_none());
        assert!(request.decided_at.is_none());
    }
}
