//! Follow graph - directed follow edges and the counts derived from them

pub mod activities;
pub mod data;
pub mod events;
pub mod models;
pub mod service;

pub use data::{AccountSummary, FollowCounts, Relationship};
pub use events::FollowEvent;
pub use models::{FollowDirection, FollowEdge, FollowListing};
pub use service::FollowGraphService;
