//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod auth;
pub mod card;
pub mod catalog;
pub mod operation_log;
pub mod resolver;
pub mod roster;
pub mod statistics;
pub mod transfer;
pub mod user;

pub use auth::{AuthError, AuthRepository};
pub use card::{CardError, CardRepository};
pub use catalog::{AtmRepository, CatalogError, ServiceRepository};
pub use operation_log::OperationLogRepository;
pub use resolver::{RecipientResolver, ResolvedRecipient};
pub use roster::{AtmRecord, RosterError, RosterRepository, UserRecord};
pub use statistics::{BranchStatistics, StatisticsError, StatisticsRepository};
pub use transfer::{TransferEngine, TransferError};
pub use user::{NewUser, UserError, UserRepository};
