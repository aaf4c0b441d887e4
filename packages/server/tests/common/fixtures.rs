//! Test fixtures for creating test data.
//!
//! Accounts are normally provisioned by the identity layer; tests go through
//! the store's provisioning hook instead.

use gallery_core::common::{Caller, Role};
use gallery_core::domains::accounts::Account;
use gallery_core::kernel::ServerDeps;

/// Provision an account and return it with a matching caller.
pub async fn provision(deps: &ServerDeps, role: Role, name: &str) -> (Account, Caller) {
    let account = deps
        .store
        .provision_account(&Account::new(role, name))
        .await
        .expect("Failed to provision account");
    let caller = Caller::new(account.id, account.role);
    (account, caller)
}

pub async fn standard_user(deps: &ServerDeps, name: &str) -> (Account, Caller) {
    provision(deps, Role::Standard, name).await
}

pub async fn artist(deps: &ServerDeps, name: &str) -> (Account, Caller) {
    provision(deps, Role::Artist, name).await
}

pub async fn admin(deps: &ServerDeps, name: &str) -> (Account, Caller) {
    provision(deps, Role::Admin, name).await
}

/// `count` standard users named `{prefix}-{i}`.
pub async fn crowd(deps: &ServerDeps, prefix: &str, count: usize) -> Vec<(Account, Caller)> {
    let mut accounts = Vec::with_capacity(count);
    for i in 0..count {
        accounts.push(standard_user(deps, &format!("{}-{}", prefix, i)).await);
    }
    accounts
}
