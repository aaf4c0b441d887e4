use tokio::time::Instant;

use crate::common::{AccountId, Role};

/// Authenticated caller, as attached by the identity layer.
///
/// The role is a claim: privileged operations re-validate it against the
/// stored account before acting on it.
#[derive(Debug, Clone)]
pub struct Caller {
    pub account_id: AccountId,
    pub role: Role,
    /// Callers may bound how long they are willing to wait for storage.
    pub deadline: Option<Instant>,
}

impl Caller {
    pub fn new(account_id: AccountId, role: Role) -> Self {
        Self {
            account_id,
            role,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
