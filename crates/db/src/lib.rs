//! Database layer with `SeaORM` entities, repositories, and the ledger engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for accounts and transactions
//! - Repository abstractions for data access
//! - The transactional ledger engine (sole authority for balance mutation)
//! - The background low-balance alert notifier
//! - Database migrations

pub mod alert;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use alert::{AlertNotifier, AlertTransport, EmailAlertTransport};
pub use repositories::{AccountRepository, LedgerEngine, TransactionLog};

use corebank_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections);

    Database::connect(options).await
}
