use thiserror::Error;

use crate::common::{AccountId, Role, SocialError};

/// Authorization errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Account {account_id} is not known (needed to {capability})")]
    UnknownAccount {
        account_id: AccountId,
        capability: &'static str,
    },

    #[error("Account {account_id} claims role {claimed} but holds {stored} (needed to {capability})")]
    RoleMismatch {
        account_id: AccountId,
        claimed: Role,
        stored: Role,
        capability: &'static str,
    },

    #[error("Permission denied for {account_id}: {capability}")]
    PermissionDenied {
        account_id: AccountId,
        capability: &'static str,
    },

    #[error(transparent)]
    Store(#[from] SocialError),
}

impl From<AuthError> for SocialError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(inner) => inner,
            AuthError::UnknownAccount {
                account_id,
                capability,
            }
            | AuthError::RoleMismatch {
                account_id,
                capability,
                ..
            }
            | AuthError::PermissionDenied {
                account_id,
                capability,
            } => SocialError::Unauthorized {
                account_id: account_id.to_string(),
                capability: capability.to_string(),
            },
        }
    }
}
