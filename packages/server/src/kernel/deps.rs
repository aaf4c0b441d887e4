//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. Storage and notification delivery sit behind trait objects so
//! tests can swap in the in-memory store and a recording notifier.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::common::{effective_deadline, Caller};
use crate::kernel::stores::PostgresStore;
use crate::kernel::{BaseNotificationEmitter, SocialStore, StreamHubNotifier};

/// Default budget for a single storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Dependencies accessible to activities.
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn SocialStore>,
    pub notifier: Arc<dyn BaseNotificationEmitter>,
    /// Upper bound on any one storage call; a caller deadline can only shorten it.
    pub storage_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn SocialStore>,
        notifier: Arc<dyn BaseNotificationEmitter>,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            storage_timeout,
        }
    }

    /// PostgreSQL-backed deps publishing to an in-process hub.
    pub fn postgres(store: PostgresStore, notifier: StreamHubNotifier, storage_timeout: Duration) -> Self {
        Self::new(Arc::new(store), Arc::new(notifier), storage_timeout)
    }

    /// Deadline for a storage call made on behalf of `caller`.
    pub fn deadline_for(&self, caller: &Caller) -> Instant {
        effective_deadline(caller.deadline, self.storage_timeout)
    }
}
