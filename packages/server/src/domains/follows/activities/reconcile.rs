use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::common::SocialResult;
use crate::domains::accounts::CountDrift;
use crate::kernel::ServerDeps;

/// Outcome of a counter consistency pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub checked_at: DateTime<Utc>,
    pub drifted: Vec<CountDrift>,
    pub repaired: bool,
}

/// Compare cached counters against the live edge set.
///
/// With `repair`, drifted accounts are recounted in the same pass. Runs
/// without a deadline; it is a maintenance job, not a caller request.
pub async fn reconcile_counts(deps: &ServerDeps, repair: bool) -> SocialResult<ReconcileReport> {
    let drifted = if repair {
        deps.store.repair_count_drift().await?
    } else {
        deps.store.find_count_drift().await?
    };

    for row in &drifted {
        warn!(
            account_id = %row.account_id,
            cached_followers = row.cached_followers,
            live_followers = row.live_followers,
            cached_following = row.cached_following,
            live_following = row.live_following,
            repaired = repair,
            "Follow counters drifted from edge set"
        );
    }
    info!(drifted = drifted.len(), repair, "Count reconciliation finished");

    Ok(ReconcileReport {
        checked_at: Utc::now(),
        drifted,
        repaired: repair,
    })
}
