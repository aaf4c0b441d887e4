// Common types and utilities shared across the application

pub mod auth;
pub mod deadline;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod pagination;
pub mod types;

pub use auth::{Actor, AuthError, Caller, Capability, HasAuthContext};
pub use entity_ids::*;
pub use deadline::{effective_deadline, within};
pub use error::{ErrorKind, SocialError, SocialResult};
pub use id::Id;
pub use pagination::{Cursor, Page, PageRequest, ValidatedPage};
pub use types::*;
