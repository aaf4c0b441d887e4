pub mod verification_request;

pub use verification_request::{Decision, RequestStatus, VerificationRequest};
