//! Operation log entries.
//!
//! Every balance mutation leaves an append-only record. A card-to-card
//! transfer produces one entry per side; a service payment produces one.

use chrono::{DateTime, Utc};
use ibank_shared::types::{AccountNumber, Amount, UserId};
use serde::{Deserialize, Serialize};

/// Kind of balance mutation recorded in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Money left the owner's card toward another card.
    SendDebit,
    /// Money arrived on the owner's card from another card.
    ReceiveCredit,
    /// Money left the owner's card toward a service.
    ServicePayment,
}

impl OperationKind {
    /// Returns true for kinds whose amount is negative.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::SendDebit | Self::ServicePayment)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendDebit => write!(f, "send_debit"),
            Self::ReceiveCredit => write!(f, "receive_credit"),
            Self::ServicePayment => write!(f, "service_payment"),
        }
    }
}

/// An operation log entry ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOperation {
    /// What happened.
    pub kind: OperationKind,
    /// User whose card was mutated.
    pub owner: UserId,
    /// Other side: an account number or a service name.
    pub counterparty: String,
    /// Negative for debits, positive for credits.
    pub signed_amount: Amount,
    /// When the unit of work recorded the mutation.
    pub recorded_at: DateTime<Utc>,
}

/// One side of a card-to-card transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferSide {
    /// Card owner.
    pub owner: UserId,
    /// Card account number.
    pub number: AccountNumber,
}

/// Builds the send and receive entries of a card-to-card transfer.
///
/// Both entries carry the same timestamp.
#[must_use]
pub fn card_transfer_entries(
    sender: TransferSide,
    recipient: TransferSide,
    amount: Amount,
    recorded_at: DateTime<Utc>,
) -> [NewOperation; 2] {
    [
        NewOperation {
            kind: OperationKind::SendDebit,
            owner: sender.owner,
            counterparty: recipient.number.to_string(),
            signed_amount: negate(amount),
            recorded_at,
        },
        NewOperation {
            kind: OperationKind::ReceiveCredit,
            owner: recipient.owner,
            counterparty: sender.number.to_string(),
            signed_amount: amount,
            recorded_at,
        },
    ]
}

/// Builds the entry of a service payment.
#[must_use]
pub fn service_payment_entry(
    owner: UserId,
    service_name: &str,
    amount: Amount,
    recorded_at: DateTime<Utc>,
) -> NewOperation {
    NewOperation {
        kind: OperationKind::ServicePayment,
        owner,
        counterparty: service_name.to_string(),
        signed_amount: negate(amount),
        recorded_at,
    }
}

// Validated amounts are non-negative, so negation cannot overflow.
fn negate(amount: Amount) -> Amount {
    amount.checked_neg().unwrap_or(Amount::new(i64::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(owner: i64, number: i64) -> TransferSide {
        TransferSide {
            owner: UserId::new(owner),
            number: AccountNumber::new(number),
        }
    }

    #[test]
    fn test_card_transfer_entries_are_dual() {
        let now = Utc::now();
        let [send, receive] = card_transfer_entries(
            side(1, 20_216_000_000_000_001),
            side(2, 20_216_000_000_000_002),
            Amount::new(100),
            now,
        );

        assert_eq!(send.kind, OperationKind::SendDebit);
        assert_eq!(send.owner, UserId::new(1));
        assert_eq!(send.counterparty, "20216000000000002");
        assert_eq!(send.signed_amount, Amount::new(-100));

        assert_eq!(receive.kind, OperationKind::ReceiveCredit);
        assert_eq!(receive.owner, UserId::new(2));
        assert_eq!(receive.counterparty, "20216000000000001");
        assert_eq!(receive.signed_amount, Amount::new(100));

        assert_eq!(send.recorded_at, receive.recorded_at);
    }

    #[test]
    fn test_service_payment_entry() {
        let entry = service_payment_entry(UserId::new(4), "Internet", Amount::new(30), Utc::now());
        assert_eq!(entry.kind, OperationKind::ServicePayment);
        assert_eq!(entry.counterparty, "Internet");
        assert_eq!(entry.signed_amount, Amount::new(-30));
    }

    #[test]
    fn test_kind_sign_and_display() {
        assert!(OperationKind::SendDebit.is_debit());
        assert!(OperationKind::ServicePayment.is_debit());
        assert!(!OperationKind::ReceiveCredit.is_debit());
        assert_eq!(OperationKind::ReceiveCredit.to_string(), "receive_credit");
    }
}
