//! Roster import and export: users and ATMs as JSON files.
//!
//! Exports carry password hashes, never plaintext. An import is one unit of
//! work: either every record lands or none does.

use std::path::Path;

use ibank_core::access::Visibility;
use ibank_shared::ErrorCategory;
use ibank_shared::types::PhoneNumber;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::catalog::insert_atm;
use super::user::{UserRow, insert_user};
use crate::entities::{atms, users};
use crate::error::unique_violation;
use crate::unit_of_work;

/// Error types for roster files.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// File could not be read or written.
    #[error("Roster file error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid roster JSON.
    #[error("Roster format error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed validation.
    #[error("Invalid roster record: {0}")]
    InvalidRecord(String),

    /// A record collides with an existing row or another record.
    #[error("Roster record conflicts with existing data: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RosterError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRecord(_) | Self::Json(_) => ErrorCategory::ValidationFailure,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::Io(_) | Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }
}

/// A user as stored in a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Full name.
    pub name: String,
    /// Unique login.
    pub login: String,
    /// Argon2 PHC hash.
    pub password_hash: String,
    /// Unique passport series.
    pub passport_series: String,
    /// Normalized phone number.
    pub phone_number: String,
    /// Access gate state.
    #[serde(default)]
    pub visibility: Visibility,
}

impl From<users::Model> for UserRecord {
    fn from(user: users::Model) -> Self {
        Self {
            name: user.name,
            login: user.login,
            password_hash: user.password_hash,
            passport_series: user.passport_series,
            phone_number: user.phone_number,
            visibility: user.visibility.into(),
        }
    }
}

impl TryFrom<UserRecord> for UserRow {
    type Error = RosterError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        if record.login.trim().is_empty() {
            return Err(RosterError::InvalidRecord("empty login".to_string()));
        }
        let phone = PhoneNumber::parse(&record.phone_number)
            .map_err(|e| RosterError::InvalidRecord(format!("{}: {e}", record.login)))?;

        Ok(Self {
            name: record.name,
            login: record.login,
            password_hash: record.password_hash,
            passport_series: record.passport_series,
            phone_number: phone.into(),
            visibility: record.visibility,
        })
    }
}

/// An ATM as stored in a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtmRecord {
    /// Unique name.
    pub name: String,
    /// Street address.
    pub address: String,
}

impl From<atms::Model> for AtmRecord {
    fn from(atm: atms::Model) -> Self {
        Self {
            name: atm.name,
            address: atm.address,
        }
    }
}

/// Roster repository.
#[derive(Debug, Clone)]
pub struct RosterRepository {
    db: DatabaseConnection,
}

impl RosterRepository {
    /// Creates a new roster repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns every user as a roster record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn export_users(&self) -> Result<Vec<UserRecord>, DbErr> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    /// Inserts every record in one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::InvalidRecord` or `RosterError::Conflict` and
    /// inserts nothing if any record is rejected.
    pub async fn import_users(&self, records: Vec<UserRecord>) -> Result<usize, RosterError> {
        let rows = records
            .into_iter()
            .map(UserRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let count = rows.len();

        let txn = unit_of_work::begin_write(&self.db).await?;
        let result = insert_users(&txn, rows).await;
        commit_or_rollback(txn, result).await?;

        info!(count, "imported user roster");
        Ok(count)
    }

    /// Returns every ATM as a roster record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn export_atms(&self) -> Result<Vec<AtmRecord>, DbErr> {
        let atms = atms::Entity::find()
            .order_by_asc(atms::Column::Id)
            .all(&self.db)
            .await?;
        Ok(atms.into_iter().map(AtmRecord::from).collect())
    }

    /// Inserts every ATM record in one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Conflict` and inserts nothing on a duplicate name.
    pub async fn import_atms(&self, records: Vec<AtmRecord>) -> Result<usize, RosterError> {
        let count = records.len();

        let txn = unit_of_work::begin_write(&self.db).await?;
        let result = insert_atms(&txn, &records).await;
        commit_or_rollback(txn, result).await?;

        info!(count, "imported ATM roster");
        Ok(count)
    }

    /// Writes the user roster to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the query, serialization or write fails.
    pub async fn export_users_to(&self, path: impl AsRef<Path>) -> Result<usize, RosterError> {
        let records = self.export_users().await?;
        write_json(path.as_ref(), &records).await?;
        Ok(records.len())
    }

    /// Reads a user roster from `path` and imports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the import
    /// fails.
    pub async fn import_users_from(&self, path: impl AsRef<Path>) -> Result<usize, RosterError> {
        let records: Vec<UserRecord> = read_json(path.as_ref()).await?;
        self.import_users(records).await
    }

    /// Writes the ATM roster to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the query, serialization or write fails.
    pub async fn export_atms_to(&self, path: impl AsRef<Path>) -> Result<usize, RosterError> {
        let records = self.export_atms().await?;
        write_json(path.as_ref(), &records).await?;
        Ok(records.len())
    }

    /// Reads an ATM roster from `path` and imports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the import
    /// fails.
    pub async fn import_atms_from(&self, path: impl AsRef<Path>) -> Result<usize, RosterError> {
        let records: Vec<AtmRecord> = read_json(path.as_ref()).await?;
        self.import_atms(records).await
    }
}

async fn insert_users(txn: &DatabaseTransaction, rows: Vec<UserRow>) -> Result<(), RosterError> {
    for row in rows {
        let login = row.login.clone();
        insert_user(txn, row).await.map_err(|e| conflict_or(e, &login))?;
    }
    Ok(())
}

async fn insert_atms(txn: &DatabaseTransaction, records: &[AtmRecord]) -> Result<(), RosterError> {
    for record in records {
        insert_atm(txn, &record.name, &record.address)
            .await
            .map_err(|e| conflict_or(e, &record.name))?;
    }
    Ok(())
}

fn conflict_or(err: DbErr, key: &str) -> RosterError {
    if unique_violation(&err).is_some() {
        RosterError::Conflict(key.to_string())
    } else {
        RosterError::Database(err)
    }
}

async fn commit_or_rollback(
    txn: DatabaseTransaction,
    result: Result<(), RosterError>,
) -> Result<(), RosterError> {
    match result {
        Ok(()) => {
            txn.commit().await?;
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback after failed import failed");
            }
            Err(err)
        }
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RosterError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, RosterError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
