// Business domains
pub mod accounts;
pub mod follows;
pub mod verification;
