//! Transaction openers for units of work.
//!
//! On SQLite a deferred transaction that reads first and writes later cannot
//! upgrade its lock while another connection writes, and fails with
//! `SQLITE_BUSY` without waiting. Write units of work therefore take the write
//! lock with their first statement, which queues them on the busy timeout
//! instead. Postgres keeps the row locks taken by `SELECT ... FOR UPDATE`.
//!
//! # Usage
//!
//! ```ignore
//! let txn = unit_of_work::begin_write(&db).await?;
//! // reads and writes
//! txn.commit().await?;
//! ```

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    IsolationLevel, TransactionTrait,
};

/// Matches no column change but makes SQLite take the write lock.
const SQLITE_WRITE_LOCK: &str =
    "UPDATE pooled_transfer_total SET total = total WHERE id = 1";

/// Begins a unit of work that will write.
///
/// # Errors
///
/// Returns an error if the transaction cannot be started or, on SQLite, the
/// write lock is still held elsewhere when the busy timeout runs out.
pub async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        if let Err(err) = txn.execute_unprepared(SQLITE_WRITE_LOCK).await {
            txn.rollback().await?;
            return Err(err);
        }
    }
    Ok(txn)
}

/// Begins a read-only unit of work in which every query sees one snapshot.
///
/// Postgres needs `REPEATABLE READ` for that; a SQLite read transaction
/// already pins its snapshot at the first read.
///
/// # Errors
///
/// Returns an error if the transaction cannot be started.
pub async fn begin_snapshot(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    match db.get_database_backend() {
        DbBackend::Postgres => {
            db.begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
        }
        _ => db.begin().await,
    }
}
