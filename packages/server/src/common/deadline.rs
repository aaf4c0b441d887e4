//! Deadline enforcement for storage calls.
//!
//! A call that exceeds its deadline is dropped mid-flight. Stores guarantee
//! that dropping a call leaves no partial state: PostgreSQL transactions roll
//! back on drop and the in-memory store mutates inside one critical section.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use super::error::SocialError;

/// The earlier of the caller's deadline and `now + budget`.
pub fn effective_deadline(caller_deadline: Option<Instant>, budget: Duration) -> Instant {
    let budget_deadline = Instant::now() + budget;
    match caller_deadline {
        Some(deadline) if deadline < budget_deadline => deadline,
        _ => budget_deadline,
    }
}

/// Run `fut` to completion or fail with `Unavailable` once `deadline` passes.
pub async fn within<T, F>(deadline: Instant, operation: &'static str, fut: F) -> Result<T, SocialError>
where
    F: Future<Output = Result<T, SocialError>>,
{
    if Instant::now() >= deadline {
        return Err(deadline_exceeded(operation));
    }
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(deadline_exceeded(operation)),
    }
}

fn deadline_exceeded(operation: &'static str) -> SocialError {
    tracing::warn!(operation, "Deadline exceeded, operation abandoned");
    SocialError::Unavailable(format!("{} exceeded its deadline", operation))
}
