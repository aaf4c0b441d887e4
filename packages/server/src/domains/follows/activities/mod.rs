//! Follow graph activities - entry-point business logic
//!
//! Activities take the authenticated caller, raw ids and the deps container,
//! run the capability check, bound storage by the caller's deadline and emit
//! events once the write has committed.

pub mod follow;
pub mod queries;
pub mod reconcile;

pub use follow::{follow, unfollow};
pub use queries::{counts, list_follows, relationship};
pub use reconcile::{reconcile_counts, ReconcileReport};
