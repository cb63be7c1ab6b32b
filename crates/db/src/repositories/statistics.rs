//! Branch statistics for the manager screen.

use ibank_shared::ErrorCategory;
use ibank_shared::types::Amount;
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use crate::entities::{cards, pooled_transfer_total, services, users};
use crate::unit_of_work;

/// Error types for statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    /// A total does not fit in an amount.
    #[error("Total of {0} balances overflows")]
    TotalOverflow(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StatisticsError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TotalOverflow(_) | Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }
}

/// Snapshot of branch-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchStatistics {
    /// Registered customers.
    pub user_count: u64,
    /// Issued cards.
    pub card_count: u64,
    /// Sum of all card balances.
    pub card_balance_total: Amount,
    /// Sum of all service balances.
    pub service_balance_total: Amount,
    /// Balance per service, in registration order.
    pub service_balances: Vec<(String, Amount)>,
    /// Running total of card-to-card transfers.
    pub pooled_total: Amount,
}

/// Statistics repository.
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    db: DatabaseConnection,
}

impl StatisticsRepository {
    /// Creates a new statistics repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Collects the current totals from a single snapshot of the store.
    ///
    /// Sums are computed here rather than with `SUM`, which Postgres widens
    /// to `NUMERIC` for `BIGINT` columns.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::TotalOverflow` if a total exceeds the amount
    /// range, or an error if a database query fails.
    pub async fn snapshot(&self) -> Result<BranchStatistics, StatisticsError> {
        let txn = unit_of_work::begin_snapshot(&self.db).await?;
        let stats = read_snapshot(&txn).await;
        // Read-only: committing just releases the snapshot.
        txn.commit().await?;
        stats
    }
}

async fn read_snapshot(txn: &DatabaseTransaction) -> Result<BranchStatistics, StatisticsError> {
    let user_count = users::Entity::find().count(txn).await?;

    let card_balances: Vec<i64> = cards::Entity::find()
        .select_only()
        .column(cards::Column::Balance)
        .into_tuple()
        .all(txn)
        .await?;

    let service_balances: Vec<(String, Amount)> = services::Entity::find()
        .order_by_asc(services::Column::Id)
        .all(txn)
        .await?
        .into_iter()
        .map(|s| (s.name, Amount::new(s.balance)))
        .collect();

    let pooled_total = pooled_transfer_total::Entity::find_by_id(pooled_transfer_total::SINGLETON_ID)
        .one(txn)
        .await?
        .map_or(Amount::ZERO, |row| Amount::new(row.total));

    let card_count = card_balances.len() as u64;
    let card_balance_total = Amount::checked_sum(card_balances.into_iter().map(Amount::new))
        .ok_or(StatisticsError::TotalOverflow("card"))?;
    let service_balance_total = Amount::checked_sum(service_balances.iter().map(|(_, b)| *b))
        .ok_or(StatisticsError::TotalOverflow("service"))?;

    Ok(BranchStatistics {
        user_count,
        card_count,
        card_balance_total,
        service_balance_total,
        service_balances,
        pooled_total,
    })
}
