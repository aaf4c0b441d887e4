//! Verification activities - entry-point business logic
//!
//! Neither `submit` nor `decide` is safe to retry blindly after an
//! `Unavailable`; callers re-read via `status` or `list_pending` first.

pub mod decide;
pub mod queries;
pub mod submit;

pub use decide::decide;
pub use queries::{list_pending, status};
pub use submit::submit;
