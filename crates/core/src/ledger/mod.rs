//! Ledger rules for moving money between cards and services.
//!
//! This module implements the pure part of the transfer engine:
//! - Amount validation
//! - Debit and credit arithmetic, including the pooled transfer total
//! - Card number issuance
//! - Operation log entries
//! - Transfer outcomes and receipts

pub mod error;
pub mod issuer;
pub mod operation;
pub mod posting;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use error::LedgerError;
pub use issuer::{ACCOUNT_NUMBER_BASE, CardSlot, next_card_slot};
pub use operation::{
    NewOperation, OperationKind, TransferSide, card_transfer_entries, service_payment_entry,
};
pub use posting::{bump_pooled_total, credit_account, credit_service, debit};
pub use types::{PolicyRejection, ServicePaymentReceipt, TransferOutcome, TransferReceipt};
pub use validation::{validate_amount, validate_opening_balance};
