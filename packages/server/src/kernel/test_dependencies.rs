// TestDependencies - in-memory wiring for tests
//
// Provides a recording notifier and a MemoryStore-backed ServerDeps.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::common::AccountId;
use crate::kernel::notifications::SocialEvent;
use crate::kernel::stores::MemoryStore;
use crate::kernel::{BaseNotificationEmitter, ServerDeps, DEFAULT_STORAGE_TIMEOUT};

// =============================================================================
// Recording notifier
// =============================================================================

/// Records every emitted event instead of delivering it.
#[derive(Default)]
pub struct TestNotifier {
    events: RwLock<Vec<SocialEvent>>,
    failing: AtomicBool,
}

impl TestNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every `emit` fails. Events are still recorded.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All events, in emission order.
    pub fn events(&self) -> Vec<SocialEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Events addressed to one account.
    pub fn events_for(&self, account_id: AccountId) -> Vec<SocialEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.recipient() == account_id)
            .cloned()
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl BaseNotificationEmitter for TestNotifier {
    async fn emit(&self, event: SocialEvent) -> Result<()> {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);

        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("notification transport down"));
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// In-memory store plus recording notifier, with handles kept for assertions.
pub struct TestDependencies {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<TestNotifier>,
    pub storage_timeout: Duration,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(TestNotifier::new()),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn with_notifier(mut self, notifier: TestNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.notifier.clone(),
            self.storage_timeout,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
