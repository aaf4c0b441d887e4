//! Operator CLI for the social core
//!
//! Every command prints a single JSON response on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_core::config::Config;
use gallery_core::domains::accounts::CountDrift;
use gallery_core::domains::follows::activities::reconcile_counts;
use gallery_core::kernel::{start_scheduler, PostgresStore, ServerDeps, StreamHub, StreamHubNotifier};

#[derive(Parser)]
#[command(name = "gallery_admin")]
#[command(about = "Maintenance commands for the follow graph and verification store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Report accounts whose cached follow counts disagree with the edge set
    CheckCounts,

    /// Recount drifted accounts from the edge set
    ReconcileCounts,

    /// Run the reconciliation job on its cron schedule until Ctrl-C
    Schedule {
        /// Override RECONCILE_SCHEDULE
        #[arg(long)]
        cron: Option<String>,
    },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drifted: Option<Vec<CountDrift>>,
}

impl Response {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            drifted: None,
        }
    }
}

fn output(resp: &Response) -> Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gallery_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let result = match cli.command {
        Commands::Migrate => cmd_migrate(&config).await,
        Commands::CheckCounts => cmd_reconcile(&config, false).await,
        Commands::ReconcileCounts => cmd_reconcile(&config, true).await,
        Commands::Schedule { cron } => cmd_schedule(&config, cron).await,
    };

    if let Err(e) = &result {
        output(&Response {
            success: false,
            message: Some(format!("{:#}", e)),
            drifted: None,
        })?;
    }
    result
}

async fn connect(config: &Config) -> Result<PostgresStore> {
    PostgresStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")
}

async fn server_deps(config: &Config, hub: StreamHub) -> Result<ServerDeps> {
    Ok(ServerDeps::postgres(
        connect(config).await?,
        StreamHubNotifier::new(hub),
        config.storage_timeout,
    ))
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_migrate(config: &Config) -> Result<()> {
    let store = connect(config).await?;
    store.migrate().await.context("Failed to run migrations")?;
    output(&Response::message("Migrations applied"))
}

async fn cmd_reconcile(config: &Config, repair: bool) -> Result<()> {
    let deps = server_deps(config, StreamHub::new()).await?;
    let report = reconcile_counts(&deps, repair).await?;

    let message = match (report.drifted.len(), repair) {
        (0, _) => "All follow counts match the edge set".to_string(),
        (n, true) => format!("Repaired {} drifted account(s)", n),
        (n, false) => format!("Found {} drifted account(s)", n),
    };

    output(&Response {
        success: true,
        message: Some(message),
        drifted: Some(report.drifted),
    })
}

async fn cmd_schedule(config: &Config, cron: Option<String>) -> Result<()> {
    let hub = StreamHub::new();
    let deps = server_deps(config, hub.clone()).await?;
    let schedule = cron.unwrap_or_else(|| config.reconcile_schedule.clone());

    let mut scheduler = start_scheduler(deps, hub, &schedule).await?;
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down scheduler");
    scheduler.shutdown().await?;
    output(&Response::message("Scheduler stopped"))
}
