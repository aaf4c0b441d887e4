//! In-process pub/sub hub for live account feeds.
//!
//! Each account has a topic (`account:{id}`); profile pages subscribe to it
//! to hear about new followers and verification decisions as they happen.
//! Payloads are `serde_json::Value` so the hub stays ignorant of event types.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Topic-keyed broadcast channels. Cheap to clone.
#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    /// Hub with 256 buffered messages per topic.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish to a topic. Returns how many subscribers received it; zero
    /// when nobody is listening.
    pub async fn publish(&self, topic: &str, value: serde_json::Value) -> usize {
        let channels = self.channels.read().await;
        match channels.get(topic) {
            Some(tx) => tx.send(value).unwrap_or(0),
            None => 0,
        }
    }

    /// Subscribe to a topic, creating it on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Drop topics nobody listens to any more. Returns how many went.
    pub async fn cleanup(&self) -> usize {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|_, tx| tx.receiver_count() > 0);
        before - channels.len()
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}
