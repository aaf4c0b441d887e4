//! Domain events and the emitters that deliver them.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::AccountId;
use crate::domains::follows::events::FollowEvent;
use crate::domains::verification::events::VerificationEvent;
use crate::kernel::stream_hub::StreamHub;
use crate::kernel::BaseNotificationEmitter;

/// Every event this crate emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum SocialEvent {
    Follow(FollowEvent),
    Verification(VerificationEvent),
}

impl SocialEvent {
    pub fn recipient(&self) -> AccountId {
        match self {
            SocialEvent::Follow(event) => event.recipient(),
            SocialEvent::Verification(event) => event.recipient(),
        }
    }

    /// Hub topic for the recipient's personal feed.
    pub fn topic(&self) -> String {
        account_topic(self.recipient())
    }
}

impl From<FollowEvent> for SocialEvent {
    fn from(event: FollowEvent) -> Self {
        SocialEvent::Follow(event)
    }
}

impl From<VerificationEvent> for SocialEvent {
    fn from(event: VerificationEvent) -> Self {
        SocialEvent::Verification(event)
    }
}

pub fn account_topic(account_id: AccountId) -> String {
    format!("account:{}", account_id)
}

/// Fire-and-forget delivery: the event is handed over, a failure is logged.
pub async fn emit_after_commit(emitter: &dyn BaseNotificationEmitter, event: impl Into<SocialEvent>) {
    let event = event.into();
    let topic = event.topic();
    if let Err(e) = emitter.emit(event).await {
        warn!(%topic, error = %e, "Notification emit failed; state change stands");
    }
}

// =============================================================================
// Emitters
// =============================================================================

/// Publishes events as JSON onto the in-process hub, one topic per recipient.
#[derive(Clone, Default)]
pub struct StreamHubNotifier {
    hub: StreamHub,
}

impl StreamHubNotifier {
    pub fn new(hub: StreamHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &StreamHub {
        &self.hub
    }
}

#[async_trait]
impl BaseNotificationEmitter for StreamHubNotifier {
    async fn emit(&self, event: SocialEvent) -> Result<()> {
        let topic = event.topic();
        let payload = serde_json::to_value(&event)?;
        self.hub.publish(&topic, payload).await;
        Ok(())
    }
}
