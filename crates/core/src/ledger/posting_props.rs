//! Property-based tests for posting and issuance.
//!
//! - Conservation: a debit plus the matching credit keeps the sum of balances
//! - Debits never leave a negative balance
//! - Issued account numbers strictly increase with the card id

use proptest::prelude::*;

use ibank_shared::types::{AccountId, Amount};

use super::issuer::next_card_slot;
use super::posting::{bump_pooled_total, credit_account, debit};
use super::types::PolicyRejection;

/// Balances up to one trillion units.
fn balance() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_transfer_conserves_total(a in balance(), b in balance(), amount in balance()) {
        let sender = AccountId::new(1);
        let recipient = AccountId::new(2);

        match debit(sender, Amount::new(a), Amount::new(amount)) {
            Ok(left) => {
                let right = credit_account(recipient, Amount::new(b), Amount::new(amount)).unwrap();
                prop_assert_eq!(left.units() + right.units(), a + b);
                prop_assert!(!left.is_negative());
            }
            Err(PolicyRejection::InsufficientFunds { balance, requested, .. }) => {
                prop_assert!(a < amount);
                prop_assert_eq!(balance, Amount::new(a));
                prop_assert_eq!(requested, Amount::new(amount));
            }
        }
    }

    #[test]
    fn prop_pooled_total_never_decreases(total in balance(), amounts in prop::collection::vec(balance(), 0..20)) {
        let mut current = Amount::new(total);
        for amount in amounts {
            let next = bump_pooled_total(current, Amount::new(amount)).unwrap();
            prop_assert!(next >= current);
            prop_assert_eq!(next.units() - current.units(), amount);
            current = next;
        }
    }

    #[test]
    fn prop_issued_numbers_strictly_increase(start in 0i64..1_000_000, count in 1usize..50) {
        let mut max_id = if start == 0 { None } else { Some(AccountId::new(start)) };
        let mut previous = None;
        for _ in 0..count {
            let slot = next_card_slot(max_id).unwrap();
            if let Some(prev) = previous {
                prop_assert!(slot.number > prev);
            }
            previous = Some(slot.number);
            max_id = Some(slot.id);
        }
    }
}
