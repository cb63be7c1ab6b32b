//! Input validation for ledger operations.
//!
//! Runs before any store access.

use ibank_shared::types::Amount;

use super::error::LedgerError;

/// Validates a transfer amount.
///
/// Zero is accepted and produces a no-op transfer; negative amounts would turn
/// a transfer into a reverse credit and are rejected.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` for negative amounts.
pub fn validate_amount(amount: Amount) -> Result<Amount, LedgerError> {
    if amount.is_negative() {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Validates the opening balance of a new card.
///
/// # Errors
///
/// Returns `LedgerError::NegativeOpeningBalance` for negative balances.
pub fn validate_opening_balance(balance: Amount) -> Result<Amount, LedgerError> {
    if balance.is_negative() {
        return Err(LedgerError::NegativeOpeningBalance(balance));
    }
    Ok(balance)
}
