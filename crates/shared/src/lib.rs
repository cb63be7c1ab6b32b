//! Shared types, errors, and configuration for IBank.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Integer currency amounts, account numbers, and phone numbers
//! - Application-wide error types and failure categories
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, BootstrapConfig, DatabaseConfig, LoggingConfig};
pub use error::{AppError, AppResult, ErrorCategory};
