//! Corebank daemon.
//!
//! Loads configuration, connects to the database, applies pending
//! migrations, and runs the background low-balance alert notifier until a
//! shutdown signal arrives.

use std::sync::Arc;

use anyhow::Context;
use corebank_core::ledger::LedgerPolicy;
use corebank_db::alert::{AlertNotifier, EmailAlertTransport};
use corebank_db::migration::{Migrator, MigratorTrait};
use corebank_db::repositories::AccountRepository;
use corebank_shared::config::AppConfig;
use corebank_shared::email::EmailService;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = corebank_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Database connected");

    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    info!("Migrations applied");

    let policy = LedgerPolicy {
        reserve: config.policy.reserve,
        low_balance_threshold: config.policy.low_balance_threshold,
        min_opening_balance: config.policy.min_opening_balance,
    };
    let email = EmailService::new(config.email.clone());
    if !email.is_configured() {
        info!("SMTP credentials not configured; alerts will be logged and skipped");
    }

    let notifier = AlertNotifier::new(
        AccountRepository::new(db.clone()),
        Arc::new(EmailAlertTransport::new(email)),
        policy,
        &config.alerts,
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let notifier_handle = tokio::spawn(notifier.run(stop_rx));
    info!("Corebank server running");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    // Let an in-flight sweep finish before exiting.
    stop_tx.send(true).ok();
    notifier_handle
        .await
        .context("alert notifier task failed")?;

    info!("Shutdown complete");
    Ok(())
}
