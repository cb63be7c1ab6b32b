//! Branch catalog: bill-pay services and ATMs.

use chrono::Utc;
use ibank_shared::ErrorCategory;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{atms, services};
use crate::error::unique_violation;

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Service or ATM name already taken.
    #[error("Name already registered: {0}")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CatalogError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateName(_) => ErrorCategory::Conflict,
            Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }
}

fn map_insert_error(name: &str, err: DbErr) -> CatalogError {
    if unique_violation(&err).is_some() {
        CatalogError::DuplicateName(name.to_string())
    } else {
        CatalogError::Database(err)
    }
}

/// Service repository.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    db: DatabaseConnection,
}

impl ServiceRepository {
    /// Creates a new service repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a service with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateName` if the name is taken.
    pub async fn create_service(&self, name: &str) -> Result<services::Model, CatalogError> {
        let service = services::ActiveModel {
            name: Set(name.to_string()),
            balance: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_insert_error(name, e))?;

        info!(service_id = service.id, name, "registered service");
        Ok(service)
    }

    /// Finds a service by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<services::Model>, DbErr> {
        services::Entity::find()
            .filter(services::Column::Name.eq(name))
            .one(&self.db)
            .await
    }

    /// Lists all services.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_services(&self) -> Result<Vec<services::Model>, DbErr> {
        services::Entity::find()
            .order_by_asc(services::Column::Id)
            .all(&self.db)
            .await
    }
}

/// ATM repository.
#[derive(Debug, Clone)]
pub struct AtmRepository {
    db: DatabaseConnection,
}

impl AtmRepository {
    /// Creates a new ATM repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers an ATM.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateName` if the name is taken.
    pub async fn create_atm(&self, name: &str, address: &str) -> Result<atms::Model, CatalogError> {
        let atm = insert_atm(&self.db, name, address)
            .await
            .map_err(|e| map_insert_error(name, e))?;

        info!(atm_id = atm.id, name, "registered ATM");
        Ok(atm)
    }

    /// Finds an ATM by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<atms::Model>, DbErr> {
        atms::Entity::find()
            .filter(atms::Column::Name.eq(name))
            .one(&self.db)
            .await
    }

    /// Lists all ATMs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_atms(&self) -> Result<Vec<atms::Model>, DbErr> {
        atms::Entity::find()
            .order_by_asc(atms::Column::Id)
            .all(&self.db)
            .await
    }
}

pub(crate) async fn insert_atm<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    address: &str,
) -> Result<atms::Model, DbErr> {
    atms::ActiveModel {
        name: Set(name.to_string()),
        address: Set(address.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}
