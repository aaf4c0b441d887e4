use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Budget for a single storage call; caller deadlines can only shorten it.
    pub storage_timeout: Duration,
    /// Six-field cron expression for the count reconciliation job.
    pub reconcile_schedule: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            storage_timeout: Duration::from_millis(
                env::var("STORAGE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("STORAGE_TIMEOUT_MS must be a valid number")?,
            ),
            reconcile_schedule: env::var("RECONCILE_SCHEDULE")
                .unwrap_or_else(|_| "0 0 * * * *".to_string()),
        })
    }
}
