//! Error taxonomy for the follow graph and verification workflow.
//!
//! Every public operation returns `Result<T, SocialError>`. Storage and
//! transport failures are folded into `Unavailable` at the store boundary so
//! nothing else crosses it.

use thiserror::Error;

/// Coarse error category, for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidOperation,
    Conflict,
    Unauthorized,
    Unavailable,
}

#[derive(Error, Debug)]
pub enum SocialError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Conflict on {entity} {id}: {reason}")]
    Conflict {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("Account {account_id} is not allowed to {capability}")]
    Unauthorized {
        account_id: String,
        capability: String,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl SocialError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        SocialError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, id: impl ToString, reason: impl Into<String>) -> Self {
        SocialError::Conflict {
            entity,
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        SocialError::InvalidOperation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SocialError::NotFound { .. } => ErrorKind::NotFound,
            SocialError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            SocialError::Conflict { .. } => ErrorKind::Conflict,
            SocialError::Unauthorized { .. } => ErrorKind::Unauthorized,
            SocialError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Whether a blind retry of the same call is meaningful.
    ///
    /// Only storage failures qualify; callers of non-idempotent operations
    /// still have to re-read state before retrying.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }
}

impl From<sqlx::Error> for SocialError {
    fn from(err: sqlx::Error) -> Self {
        SocialError::Unavailable(err.to_string())
    }
}

pub type SocialResult<T> = Result<T, SocialError>;
