//! Kernel module - infrastructure traits, stores and dependencies.

pub mod deps;
pub mod notifications;
pub mod scheduled_tasks;
pub mod stores;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, DEFAULT_STORAGE_TIMEOUT};
pub use notifications::{account_topic, emit_after_commit, SocialEvent, StreamHubNotifier};
pub use scheduled_tasks::{start_scheduler, HUB_CLEANUP_SCHEDULE};
pub use stores::{MemoryStore, PostgresStore};
pub use stream_hub::StreamHub;
pub use test_dependencies::{TestDependencies, TestNotifier};
pub use traits::*;
