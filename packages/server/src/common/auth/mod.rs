/// Authorization for the follow graph and verification workflow.
///
/// Every privileged operation goes through one entry point:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, Capability};
///
/// let reviewer = Actor::new(&caller)
///     .can(Capability::DecideVerification)
///     .check(deps.store.as_ref())
///     .await?;
/// ```
///
/// The check re-reads the caller's account on every call, so a role that
/// was revoked after the session was issued stops working immediately.

mod builder;
mod caller;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder, HasAuthContext};
pub use caller::Caller;
pub use capability::Capability;
pub use errors::AuthError;
