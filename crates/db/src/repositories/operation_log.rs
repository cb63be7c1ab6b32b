//! Operation log: append-only record of every balance mutation.
//!
//! Appends happen only inside the transfer engine's unit of work, so the
//! append function takes a `DatabaseTransaction` and is crate-private.

use ibank_core::ledger::NewOperation;
use ibank_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::operations_log;

/// Read access to the operation log.
#[derive(Debug, Clone)]
pub struct OperationLogRepository {
    db: DatabaseConnection,
}

impl OperationLogRepository {
    /// Creates a new operation log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns a user's entries in insertion order. Unknown users get an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn query_by_owner(&self, owner: UserId) -> Result<Vec<operations_log::Model>, DbErr> {
        operations_log::Entity::find()
            .filter(operations_log::Column::OwnerId.eq(owner.get()))
            .order_by_asc(operations_log::Column::Id)
            .all(&self.db)
            .await
    }

    /// Returns every entry in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn query_all(&self) -> Result<Vec<operations_log::Model>, DbErr> {
        operations_log::Entity::find()
            .order_by_asc(operations_log::Column::Id)
            .all(&self.db)
            .await
    }
}

/// Appends one entry inside an open unit of work.
pub(crate) async fn append(
    txn: &DatabaseTransaction,
    entry: NewOperation,
) -> Result<operations_log::Model, DbErr> {
    operations_log::ActiveModel {
        kind: Set(entry.kind.into()),
        owner_id: Set(entry.owner.get()),
        counterparty: Set(entry.counterparty),
        amount: Set(entry.signed_amount.units()),
        recorded_at: Set(entry.recorded_at),
        ..Default::default()
    }
    .insert(txn)
    .await
}
