// Storage backends for the follow graph and verification workflow

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::common::{AccountId, HasAuthContext, Role, SocialResult};
use crate::kernel::SocialStore;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Authorization reads the caller's role straight from the account table.
#[async_trait]
impl HasAuthContext for dyn SocialStore {
    async fn stored_role(&self, account_id: AccountId) -> SocialResult<Option<Role>> {
        Ok(self.find_account(account_id).await?.map(|a| a.role))
    }
}
