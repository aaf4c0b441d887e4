pub mod follow_edge;

pub use follow_edge::{FollowDirection, FollowEdge, FollowListing};
