//! Domain types for transfer results.

use chrono::{DateTime, Utc};
use ibank_shared::types::{AccountId, AccountNumber, Amount, ServiceId};
use serde::{Deserialize, Serialize};

/// An expected refusal that leaves every balance untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PolicyRejection {
    /// The sender's balance is below the requested amount.
    InsufficientFunds {
        /// Sending account.
        account: AccountId,
        /// Balance at the time of the check.
        balance: Amount,
        /// Amount that was requested.
        requested: Amount,
    },
}

impl std::fmt::Display for PolicyRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientFunds {
                account,
                balance,
                requested,
            } => write!(
                f,
                "insufficient funds on account {account}: balance {balance}, requested {requested}"
            ),
        }
    }
}

/// Result of a unit of work that either committed or was refused by policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome<R> {
    /// The unit of work committed.
    Completed(R),
    /// The unit of work ended cleanly without any mutation.
    Rejected(PolicyRejection),
}

impl<R> TransferOutcome<R> {
    /// Returns true if the transfer committed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the receipt of a committed transfer.
    #[must_use]
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(receipt) => Some(receipt),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the rejection reason of a refused transfer.
    #[must_use]
    pub const fn rejection(&self) -> Option<&PolicyRejection> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Receipt of a committed card-to-card transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Debited card.
    pub sender: AccountId,
    /// Debited card's number.
    pub sender_number: AccountNumber,
    /// Credited card.
    pub recipient: AccountId,
    /// Credited card's number.
    pub recipient_number: AccountNumber,
    /// Amount moved.
    pub amount: Amount,
    /// Sender balance after commit.
    pub sender_balance: Amount,
    /// Recipient balance after commit.
    pub recipient_balance: Amount,
    /// Pooled transfer total after commit.
    pub pooled_total: Amount,
    /// Timestamp shared by both log entries.
    pub recorded_at: DateTime<Utc>,
}

/// Receipt of a committed service payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePaymentReceipt {
    /// Debited card.
    pub sender: AccountId,
    /// Credited service.
    pub service: ServiceId,
    /// Credited service name.
    pub service_name: String,
    /// Amount paid.
    pub amount: Amount,
    /// Sender balance after commit.
    pub sender_balance: Amount,
    /// Service balance after commit.
    pub service_balance: Amount,
    /// Timestamp of the log entry.
    pub recorded_at: DateTime<Utc>,
}
