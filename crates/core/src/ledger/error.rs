//! Ledger error types for validation and resolution failures.
//!
//! Insufficient funds is deliberately absent: it is a policy rejection carried
//! by [`TransferOutcome`](super::TransferOutcome), not an error.

use ibank_shared::ErrorCategory;
use ibank_shared::types::{AccountId, AccountNumber, Amount, PhoneNumber, UserId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transfer amount is negative.
    #[error("Transfer amount must not be negative, got {0}")]
    InvalidAmount(Amount),

    /// Opening balance of a new card is negative.
    #[error("Opening balance must not be negative, got {0}")]
    NegativeOpeningBalance(Amount),

    // ========== Capacity Errors ==========
    /// Crediting the account would overflow its balance.
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(AccountId),

    /// Crediting the service would overflow its balance.
    #[error("Balance overflow on service '{0}'")]
    ServiceBalanceOverflow(String),

    /// The pooled transfer total would overflow.
    #[error("Pooled transfer total overflow")]
    PooledTotalOverflow,

    /// No more account numbers can be issued.
    #[error("Account number space exhausted")]
    AccountNumberSpaceExhausted,

    // ========== Resolution Errors ==========
    /// No user is registered with this phone number.
    #[error("No client is registered with phone number {0}")]
    RecipientNotFound(PhoneNumber),

    /// The user exists but owns no card.
    #[error("Client {0} has no account")]
    RecipientHasNoAccount(UserId),

    /// No card carries this account number.
    #[error("Invalid account number: {0}")]
    InvalidAccountNumber(AccountNumber),

    /// No service with this name.
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Card owner not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),
}

impl LedgerError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAmount(_) | Self::NegativeOpeningBalance(_) => {
                ErrorCategory::ValidationFailure
            }

            // Stored values hit the column range; the input itself was fine.
            Self::BalanceOverflow(_)
            | Self::ServiceBalanceOverflow(_)
            | Self::PooledTotalOverflow
            | Self::AccountNumberSpaceExhausted => ErrorCategory::StoreFailure,

            Self::RecipientNotFound(_)
            | Self::RecipientHasNoAccount(_)
            | Self::InvalidAccountNumber(_)
            | Self::ServiceNotFound(_)
            | Self::AccountNotFound(_)
            | Self::UserNotFound(_) => ErrorCategory::ResolutionFailure,
        }
    }

    /// Returns the error code for logs and callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::NegativeOpeningBalance(_) => "NEGATIVE_OPENING_BALANCE",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            Self::ServiceBalanceOverflow(_) => "SERVICE_BALANCE_OVERFLOW",
            Self::PooledTotalOverflow => "POOLED_TOTAL_OVERFLOW",
            Self::AccountNumberSpaceExhausted => "ACCOUNT_NUMBER_SPACE_EXHAUSTED",
            Self::RecipientNotFound(_) => "RECIPIENT_NOT_FOUND",
            Self::RecipientHasNoAccount(_) => "RECIPIENT_HAS_NO_ACCOUNT",
            Self::InvalidAccountNumber(_) => "INVALID_ACCOUNT_NUMBER",
            Self::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
        }
    }
}
