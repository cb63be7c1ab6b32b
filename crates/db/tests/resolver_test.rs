//! Integration tests for recipient resolution.

mod common;

use ibank_core::ledger::LedgerError;
use ibank_db::{RecipientResolver, TransferError};
use ibank_shared::ErrorCategory;
use ibank_shared::types::{AccountId, AccountNumber, PhoneNumber};

use common::{card, customer, setup};

#[tokio::test]
async fn test_resolve_by_phone() {
    let db = setup().await;
    let bob = customer(&db, "bob", "+7 (900) 123-45-67").await;
    let b = card(&db, bob, 0).await;

    let phone = PhoneNumber::parse("+79001234567").unwrap();
    let target = RecipientResolver::new(db.clone())
        .resolve_by_phone(&phone)
        .await
        .unwrap();

    assert_eq!(target.account(), AccountId::new(b.id));
    assert_eq!(target.number(), AccountNumber::new(b.account_number));
    assert_eq!(target.owner(), bob);
}

#[tokio::test]
async fn test_unknown_phone() {
    let db = setup().await;
    let phone = PhoneNumber::parse("91100").unwrap();

    let err = RecipientResolver::new(db.clone())
        .resolve_by_phone(&phone)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Ledger(LedgerError::RecipientNotFound(_))));
    assert_eq!(err.category(), ErrorCategory::ResolutionFailure);
}

#[tokio::test]
async fn test_phone_owner_without_card() {
    let db = setup().await;
    let carol = customer(&db, "carol", "900000003").await;

    let err = RecipientResolver::new(db.clone())
        .resolve_by_phone(&PhoneNumber::parse("900000003").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransferError::Ledger(LedgerError::RecipientHasNoAccount(id)) if id == carol
    ));
}

#[tokio::test]
async fn test_shared_phone_resolves_to_lowest_ids() {
    let db = setup().await;
    let first = customer(&db, "first", "900000009").await;
    let second = customer(&db, "second", "900000009").await;
    card(&db, second, 0).await;
    let oldest = card(&db, first, 0).await;
    card(&db, first, 0).await;

    let target = RecipientResolver::new(db.clone())
        .resolve_by_phone(&PhoneNumber::parse("900000009").unwrap())
        .await
        .unwrap();

    assert_eq!(target.owner(), first);
    assert_eq!(target.account(), AccountId::new(oldest.id));
}

#[tokio::test]
async fn test_resolve_by_account_number() {
    let db = setup().await;
    let bob = customer(&db, "bob", "900000002").await;
    let b = card(&db, bob, 0).await;
    let resolver = RecipientResolver::new(db.clone());

    let target = resolver
        .resolve_by_account_number(AccountNumber::new(b.account_number))
        .await
        .unwrap();
    assert_eq!(target.account(), AccountId::new(b.id));

    let missing = AccountNumber::new(b.account_number + 100);
    let err = resolver.resolve_by_account_number(missing).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::Ledger(LedgerError::InvalidAccountNumber(n)) if n == missing
    ));
}
