// Gallery community - social core
//
// This crate provides the follow graph and the artist verification workflow
// behind the community web app. Identity, rendering and delivery of
// notifications live elsewhere; callers arrive already authenticated.
//
// Each domain is laid out as models/ (rows and SQL), data/ (response types),
// events/ and activities/ (entry-point business logic), with a service handle
// on top.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
pub use domains::follows::FollowGraphService;
pub use domains::verification::VerificationWorkflow;
