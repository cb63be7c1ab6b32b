//! Core business logic for IBank.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! The db crate reads rows inside its units of work and asks this crate what
//! to write.
//!
//! # Modules
//!
//! - `ledger` - Transfer rules, issuance and the operation log entries
//! - `access` - Customer visibility
//! - `auth` - Password hashing, login checks and sessions

pub mod access;
pub mod auth;
pub mod ledger;
