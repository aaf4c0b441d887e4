use async_trait::async_trait;

use super::{AuthError, Caller, Capability};
use crate::common::{AccountId, Role, SocialResult};

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// Actor::new(&caller)
///     .can(Capability::DecideVerification)
///     .check(deps.store.as_ref())
///     .await?;
/// ```
pub struct Actor {
    account_id: AccountId,
    claimed_role: Role,
}

impl Actor {
    pub fn new(caller: &Caller) -> Self {
        Self {
            account_id: caller.account_id,
            claimed_role: caller.role,
        }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            account_id: self.account_id,
            claimed_role: self.claimed_role,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    account_id: AccountId,
    claimed_role: Role,
    capability: Capability,
}

impl CapabilityBuilder {
    /// Perform the authorization check. Returns the actor's id on success.
    pub async fn check<D>(self, deps: &D) -> Result<AccountId, AuthError>
    where
        D: HasAuthContext + ?Sized,
    {
        check_capability(self.account_id, self.claimed_role, self.capability, deps).await
    }
}

/// Anything that can tell us an account's current role.
#[async_trait]
pub trait HasAuthContext: Send + Sync {
    async fn stored_role(&self, account_id: AccountId) -> SocialResult<Option<Role>>;
}

/// The claimed role must grant the capability, and it must still be the
/// role on record. A session minted before a demotion fails here.
async fn check_capability<D>(
    account_id: AccountId,
    claimed_role: Role,
    capability: Capability,
    deps: &D,
) -> Result<AccountId, AuthError>
where
    D: HasAuthContext + ?Sized,
{
    if !capability.permits(claimed_role) {
        tracing::debug!(%account_id, ?claimed_role, ?capability, "Capability denied");
        return Err(AuthError::PermissionDenied {
            account_id,
            capability: capability.describe(),
        });
    }

    let stored = deps
        .stored_role(account_id)
        .await?
        .ok_or(AuthError::UnknownAccount {
            account_id,
            capability: capability.describe(),
        })?;

    if stored != claimed_role {
        tracing::warn!(%account_id, ?claimed_role, ?stored, "Stale role claim rejected");
        return Err(AuthError::RoleMismatch {
            account_id,
            claimed: claimed_role,
            stored,
            capability: capability.describe(),
        });
    }

    Ok(account_id)
}
