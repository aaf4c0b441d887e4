//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (RECONCILE_SCHEDULE, hourly by default)
//!     │
//!     └─► reconcile_counts(repair = true)
//!             └─► recount drifted accounts from follow_edges
//!
//! Scheduler (every minute)
//!     │
//!     └─► StreamHub::cleanup
//!             └─► drop account topics with no live subscribers
//! ```
//!
//! Counters are kept exact by the edge transaction; this job only reports and
//! repairs drift introduced out of band (manual SQL, restored backups).

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::follows::activities::reconcile_counts;
use crate::kernel::{ServerDeps, StreamHub};

/// Cron expression for sweeping abandoned hub topics.
pub const HUB_CLEANUP_SCHEDULE: &str = "0 * * * * *";

/// Start all scheduled tasks
pub async fn start_scheduler(
    deps: ServerDeps,
    hub: StreamHub,
    reconcile_schedule: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let reconcile_job = Job::new_async(reconcile_schedule, move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            match reconcile_counts(&deps, true).await {
                Ok(report) if report.drifted.is_empty() => {
                    tracing::debug!("Count reconciliation found no drift");
                }
                Ok(report) => {
                    tracing::warn!(
                        repaired = report.drifted.len(),
                        "Count reconciliation repaired drifted accounts"
                    );
                }
                Err(e) => tracing::error!("Count reconciliation task failed: {}", e),
            }
        })
    })
    .with_context(|| format!("Invalid reconcile schedule: {}", reconcile_schedule))?;

    let cleanup_job = Job::new_async(HUB_CLEANUP_SCHEDULE, move |_uuid, _lock| {
        let hub = hub.clone();
        Box::pin(async move {
            let removed = hub.cleanup().await;
            if removed > 0 {
                tracing::debug!(removed, "Dropped abandoned stream hub topics");
            }
        })
    })?;

    scheduler.add(reconcile_job).await?;
    scheduler.add(cleanup_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %reconcile_schedule, "Scheduled tasks started (count reconciliation, hub cleanup)");
    Ok(scheduler)
}
