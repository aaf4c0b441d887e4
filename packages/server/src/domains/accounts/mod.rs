//! Accounts - read-mostly view of identity-owned account rows

pub mod models;

pub use models::{Account, CountDrift};
