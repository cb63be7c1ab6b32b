//! `SeaORM` entity definitions.

pub mod atms;
pub mod cards;
pub mod managers;
pub mod operations_log;
pub mod pooled_transfer_total;
pub mod sea_orm_active_enums;
pub mod services;
pub mod users;
