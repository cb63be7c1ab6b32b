//! Database seeder for IBank.
//!
//! Migrates the configured database, creates the bootstrap manager and a
//! small demo branch. Anything already present is skipped, so the seeder can
//! be run repeatedly.
//!
//! Usage: cargo run --bin seeder

use ibank_db::migration::Migrator;
use ibank_db::{
    AtmRepository, AuthRepository, CardRepository, NewUser, ServiceRepository, UserRepository,
    connect, store_error,
};
use ibank_shared::types::{Amount, UserId};
use ibank_shared::{AppConfig, AppResult, BootstrapConfig, LoggingConfig};
use sea_orm_migration::MigratorTrait;
use sea_orm_migration::sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// A demo customer with one card.
struct DemoCustomer {
    name: &'static str,
    login: &'static str,
    password: &'static str,
    passport_series: &'static str,
    phone_number: &'static str,
    card_name: &'static str,
    opening_balance: i64,
}

const DEMO_CUSTOMERS: [DemoCustomer; 2] = [
    DemoCustomer {
        name: "Anna Petrova",
        login: "anna",
        password: "anna-demo",
        passport_series: "4510 123456",
        phone_number: "+7 900 100-20-30",
        card_name: "Anna debit",
        opening_balance: 5_000,
    },
    DemoCustomer {
        name: "Boris Ivanov",
        login: "boris",
        password: "boris-demo",
        passport_series: "4511 654321",
        phone_number: "+7 900 400-50-60",
        card_name: "Boris debit",
        opening_balance: 1_500,
    },
];

const DEMO_SERVICES: [&str; 2] = ["Mobile operator", "City utilities"];

const DEMO_ATMS: [(&str, &str); 1] = [("ATM-001", "1 Central Square")];

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let db = connect(&config.database)
        .await
        .map_err(|e| store_error(&e))?;
    info!("Connected to database");

    Migrator::up(&db, None).await.map_err(|e| store_error(&e))?;
    info!("Migrations applied");

    seed_manager(&db, &config.bootstrap).await?;
    seed_customers(&db).await?;
    seed_services(&db).await?;
    seed_atms(&db).await?;

    info!("Seeding complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn seed_manager(db: &DatabaseConnection, bootstrap: &BootstrapConfig) -> AppResult<()> {
    let auth = AuthRepository::new(db.clone());

    if auth
        .find_manager_by_login(&bootstrap.manager_login)
        .await
        .map_err(|e| store_error(&e))?
        .is_some()
    {
        info!(login = %bootstrap.manager_login, "Manager already exists, skipping");
        return Ok(());
    }

    auth.create_manager(
        &bootstrap.manager_name,
        &bootstrap.manager_login,
        &bootstrap.manager_password,
    )
    .await?;
    Ok(())
}

async fn seed_customers(db: &DatabaseConnection) -> AppResult<()> {
    let users = UserRepository::new(db.clone());
    let cards = CardRepository::new(db.clone());

    for demo in &DEMO_CUSTOMERS {
        if users
            .find_by_login(demo.login)
            .await
            .map_err(|e| store_error(&e))?
            .is_some()
        {
            info!(login = demo.login, "Customer already exists, skipping");
            continue;
        }

        let user = users
            .create_user(NewUser {
                name: demo.name.to_string(),
                login: demo.login.to_string(),
                password: demo.password.to_string(),
                passport_series: demo.passport_series.to_string(),
                phone_number: demo.phone_number.to_string(),
            })
            .await?;

        cards
            .issue_card(
                UserId::new(user.id),
                demo.card_name,
                Amount::new(demo.opening_balance),
            )
            .await?;
    }
    Ok(())
}

async fn seed_services(db: &DatabaseConnection) -> AppResult<()> {
    let services = ServiceRepository::new(db.clone());

    for name in DEMO_SERVICES {
        if services
            .find_by_name(name)
            .await
            .map_err(|e| store_error(&e))?
            .is_some()
        {
            info!(name, "Service already exists, skipping");
            continue;
        }
        services.create_service(name).await?;
    }
    Ok(())
}

async fn seed_atms(db: &DatabaseConnection) -> AppResult<()> {
    let atms = AtmRepository::new(db.clone());

    for (name, address) in DEMO_ATMS {
        if atms
            .find_by_name(name)
            .await
            .map_err(|e| store_error(&e))?
            .is_some()
        {
            info!(name, "ATM already exists, skipping");
            continue;
        }
        atms.create_atm(name, address).await?;
    }
    Ok(())
}
