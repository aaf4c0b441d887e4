use crate::common::Role;

/// Capabilities gated by account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Follow and unfollow other accounts
    FollowAccounts,

    /// Submit evidence for the Verified badge
    SubmitVerification,

    /// Approve or reject verification requests
    DecideVerification,

    /// Read the moderation queue
    ViewModerationQueue,
}

impl Capability {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Capability::FollowAccounts => true,
            Capability::SubmitVerification => role == Role::Artist,
            Capability::DecideVerification | Capability::ViewModerationQueue => {
                role == Role::Admin
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Capability::FollowAccounts => "follow accounts",
            Capability::SubmitVerification => "submit verification requests",
            Capability::DecideVerification => "decide verification requests",
            Capability::ViewModerationQueue => "view the moderation queue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_is_admin_only() {
        for capability in [Capability::DecideVerification, Capability::ViewModerationQueue] {
            assert!(capability.permits(Role::Admin));
            assert!(!capability.permits(Role::Artist));
            assert!(!capability.permits(Role::Standard));
        }
    }

    #[test]
    fn test_only_artists_submit() {
        assert!(Capability::SubmitVerification.permits(Role::Artist));
        assert!(!Capability::SubmitVerification.permits(Role::Admin));
        assert!(!Capability::SubmitVerification.permits(Role::Standard));
    }
}
