//! Shared setup for the db integration tests.
//!
//! Every test gets a private SQLite database, migrated with the production
//! migrator: in memory on one connection, or a file behind a real pool for
//! the concurrency tests.

#![allow(dead_code)]

use ibank_db::entities::{cards, pooled_transfer_total};
use ibank_db::migration::{Migrator, MigratorTrait};
use ibank_db::{CardRepository, NewUser, UserRepository, connect};
use ibank_shared::DatabaseConfig;
use ibank_shared::types::{AccountId, Amount, UserId};
use sea_orm::{DatabaseConnection, EntityTrait};
use tempfile::TempDir;

pub const PASSWORD: &str = "secret";

/// Connections in the pool used by [`setup_pool`].
pub const POOL_SIZE: u32 = 8;

pub async fn setup() -> DatabaseConnection {
    let db = connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

/// Opens a file-backed database in a fresh temp dir with [`POOL_SIZE`]
/// connections. Keep the returned dir alive for the whole test.
pub async fn setup_pool() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("ibank.db").display()),
        max_connections: POOL_SIZE,
        min_connections: 1,
        acquire_timeout_secs: 30,
        sqlx_logging: false,
    };
    let db = connect(&config).await.expect("Failed to open database file");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    (dir, db)
}

pub fn new_user(login: &str, phone: &str) -> NewUser {
    NewUser {
        name: format!("Customer {login}"),
        login: login.to_string(),
        password: PASSWORD.to_string(),
        passport_series: format!("PS-{login}"),
        phone_number: phone.to_string(),
    }
}

pub async fn customer(db: &DatabaseConnection, login: &str, phone: &str) -> UserId {
    let user = UserRepository::new(db.clone())
        .create_user(new_user(login, phone))
        .await
        .expect("Failed to create user");
    UserId::new(user.id)
}

pub async fn card(db: &DatabaseConnection, owner: UserId, balance: i64) -> cards::Model {
    CardRepository::new(db.clone())
        .issue_card(owner, "main", Amount::new(balance))
        .await
        .expect("Failed to issue card")
}

pub async fn balance(db: &DatabaseConnection, id: AccountId) -> i64 {
    cards::Entity::find_by_id(id.get())
        .one(db)
        .await
        .expect("Failed to read card")
        .expect("Card should exist")
        .balance
}

pub async fn pooled_total(db: &DatabaseConnection) -> i64 {
    pooled_transfer_total::Entity::find_by_id(pooled_transfer_total::SINGLETON_ID)
        .one(db)
        .await
        .expect("Failed to read pooled total")
        .expect("Pooled total row should exist")
        .total
}
