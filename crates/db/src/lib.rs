//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations
//! - Repositories, including the transfer engine that owns every balance
//!   mutation

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
mod unit_of_work;

pub use error::{is_retryable, store_error};
pub use repositories::{
    AtmRepository, AuthError, AuthRepository, BranchStatistics, CardError, CardRepository,
    CatalogError, NewUser, OperationLogRepository, RecipientResolver, ResolvedRecipient,
    RosterError, RosterRepository, ServiceRepository, StatisticsError, StatisticsRepository,
    TransferEngine, TransferError, UserError, UserRepository,
};

use std::time::Duration;

use ibank_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the configured database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(config.sqlx_logging);

    tracing::debug!(
        max_connections = config.max_connections,
        "connecting to database"
    );
    Database::connect(options).await
}
