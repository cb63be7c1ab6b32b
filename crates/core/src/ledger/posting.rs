//! Balance arithmetic applied by the transfer engine.
//!
//! These functions are pure: the db layer reads balances inside its unit of
//! work, asks this module for the new values, and writes them back.

use ibank_shared::types::{AccountId, Amount};

use super::error::LedgerError;
use super::types::PolicyRejection;

/// Computes the sender balance after a debit.
///
/// `amount` must already be validated as non-negative.
///
/// # Errors
///
/// Returns `PolicyRejection::InsufficientFunds` if `balance < amount`.
pub fn debit(account: AccountId, balance: Amount, amount: Amount) -> Result<Amount, PolicyRejection> {
    let rejection = PolicyRejection::InsufficientFunds {
        account,
        balance,
        requested: amount,
    };
    if balance < amount {
        return Err(rejection);
    }
    balance
        .checked_sub(amount)
        .filter(|left| !left.is_negative())
        .ok_or(rejection)
}

/// Computes a card balance after a credit.
///
/// # Errors
///
/// Returns `LedgerError::BalanceOverflow` if the balance would exceed `i64`.
pub fn credit_account(account: AccountId, balance: Amount, amount: Amount) -> Result<Amount, LedgerError> {
    balance
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow(account))
}

/// Computes a service balance after a payment.
///
/// # Errors
///
/// Returns `LedgerError::ServiceBalanceOverflow` on overflow.
pub fn credit_service(service: &str, balance: Amount, amount: Amount) -> Result<Amount, LedgerError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::ServiceBalanceOverflow(service.to_string()))
}

/// Computes the pooled transfer total after a card-to-card transfer.
///
/// # Errors
///
/// Returns `LedgerError::PooledTotalOverflow` on overflow.
pub fn bump_pooled_total(total: Amount, amount: Amount) -> Result<Amount, LedgerError> {
    total
        .checked_add(amount)
        .ok_or(LedgerError::PooledTotalOverflow)
}
