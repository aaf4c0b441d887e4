//! Artist verification - submit, review and decide requests for the Verified badge

pub mod activities;
pub mod data;
pub mod events;
pub mod models;
pub mod service;

pub use data::{DecisionRecord, PendingRequest, SubmitReceipt, VerificationStatusView};
pub use events::VerificationEvent;
pub use models::{Decision, RequestStatus, VerificationRequest};
pub use service::VerificationWorkflow;
