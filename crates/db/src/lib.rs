//! Postgres persistence for the Tally ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories implementing the `tally-core` store traits
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, CompanyRepository, JournalRepository, LedgerQueryRepository,
};

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_core::ledger::LedgerService;
use tally_shared::LedgerConfig;
use tally_shared::config::DatabaseConfig;
use tracing::info;

/// Ledger service wired to the Postgres repositories.
pub type PgLedgerService = LedgerService<AccountRepository, JournalRepository, LedgerQueryRepository>;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the configured pool bounds.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connected"
    );
    Ok(db)
}

/// Builds a ledger service over one shared connection pool.
#[must_use]
pub fn ledger_service(db: &DatabaseConnection, config: &LedgerConfig) -> PgLedgerService {
    LedgerService::new(
        Arc::new(AccountRepository::new(db.clone())),
        Arc::new(JournalRepository::with_config(db.clone(), config)),
        Arc::new(LedgerQueryRepository::new(db.clone())),
    )
}
