//! Typed ID definitions for the entities this crate touches.
//!
//! ```rust
//! use gallery_core::common::{AccountId, VerificationRequestId};
//!
//! let account_id = AccountId::new();
//! let request_id = VerificationRequestId::new();
//! // let wrong: AccountId = request_id; // compile error
//! # let _ = (account_id, request_id);
//! ```

pub use super::id::Id;

/// Marker type for accounts (owned by the identity layer).
pub struct Account;

/// Marker type for artist verification requests.
pub struct VerificationRequest;

pub type AccountId = Id<Account>;

pub type VerificationRequestId = Id<VerificationRequest>;
