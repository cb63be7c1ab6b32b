//! Concurrent access tests for issuance, transfers and statistics.
//!
//! Every test runs on a file-backed SQLite pool with several connections, so
//! units of work genuinely overlap. A call may fail only with a retryable
//! store error; the invariants are checked over the calls that committed.
//!
//! These tests verify that:
//! - Concurrently issued cards get distinct, strictly increasing numbers
//! - Transfers on disjoint cards all go through side by side
//! - Concurrent transfers in both directions conserve currency
//! - Concurrent debits of one card never overdraw it
//! - A statistics snapshot never sees half of a unit of work

use std::sync::Arc;

use futures::future::join_all;
use ibank_core::ledger::{ACCOUNT_NUMBER_BASE, TransferOutcome};
use ibank_db::entities::operations_log;
use ibank_db::{
    CardRepository, RecipientResolver, ResolvedRecipient, ServiceRepository, StatisticsError,
    StatisticsRepository, TransferEngine, is_retryable,
};
use ibank_shared::types::{AccountId, AccountNumber, Amount};
use sea_orm::{DatabaseConnection, EntityTrait};
use tokio::sync::Barrier;

mod common;

use common::{balance, card, customer, pooled_total, setup_pool};

const CARDS: usize = 20;
const PAIRS: i64 = 8;
const ROUNDS: i64 = 40;

async fn recipient(db: &DatabaseConnection, number: i64) -> ResolvedRecipient {
    RecipientResolver::new(db.clone())
        .resolve_by_account_number(AccountNumber::new(number))
        .await
        .expect("Failed to resolve recipient")
}

async fn log_len(db: &DatabaseConnection) -> usize {
    operations_log::Entity::find()
        .all(db)
        .await
        .expect("Failed to read log")
        .len()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_numbers_are_unique_and_increasing() {
    let (_dir, db) = setup_pool().await;
    let alice = customer(&db, "alice", "900000001").await;
    let repo = CardRepository::new(db.clone());

    let barrier = Arc::new(Barrier::new(CARDS));
    let handles: Vec<_> = (0..CARDS)
        .map(|i| {
            let repo = repo.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                repo.issue_card(alice, &format!("card-{i}"), Amount::ZERO).await
            })
        })
        .collect();

    let mut committed = 0;
    for result in join_all(handles).await {
        match result.expect("Task panicked") {
            Ok(_) => committed += 1,
            Err(err) => assert!(err.is_retryable(), "issuance failed for good: {err}"),
        }
    }
    assert!(committed > 0);

    let cards = repo.list_all().await.unwrap();
    assert_eq!(cards.len(), committed);
    for pair in cards.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert!(pair[0].account_number < pair[1].account_number);
    }
    for card in &cards {
        assert_eq!(card.account_number, ACCOUNT_NUMBER_BASE + card.id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_transfers_run_side_by_side() {
    let (_dir, db) = setup_pool().await;
    let engine = TransferEngine::new(db.clone());

    let mut pairs = Vec::new();
    for i in 0..PAIRS {
        let sender = customer(&db, &format!("sender{i}"), &format!("90010{i:04}")).await;
        let receiver = customer(&db, &format!("receiver{i}"), &format!("90020{i:04}")).await;
        let from = card(&db, sender, 500).await;
        let to = card(&db, receiver, 500).await;
        let target = recipient(&db, to.account_number).await;
        pairs.push((AccountId::new(from.id), target, Amount::new(i + 1)));
    }

    let barrier = Arc::new(Barrier::new(pairs.len()));
    let handles: Vec<_> = pairs
        .iter()
        .map(|&(sender, target, amount)| {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                engine.transfer(sender, &target, amount).await
            })
        })
        .collect();

    let mut moved = 0;
    let mut committed = 0;
    for (result, &(sender, target, amount)) in join_all(handles).await.into_iter().zip(&pairs) {
        let sender_balance = balance(&db, sender).await;
        let target_balance = balance(&db, target.account()).await;
        assert_eq!(sender_balance + target_balance, 1_000);

        match result.expect("Task panicked") {
            Ok(outcome) => {
                assert!(outcome.is_completed());
                assert_eq!(sender_balance, 500 - amount.units());
                moved += amount.units();
                committed += 1;
            }
            Err(err) => {
                assert!(err.is_retryable(), "transfer failed for good: {err}");
                assert_eq!(sender_balance, 500);
            }
        }
    }

    assert!(committed > 0);
    assert_eq!(pooled_total(&db).await, moved);
    assert_eq!(log_len(&db).await, committed * 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_opposite_transfers_conserve_currency() {
    let (_dir, db) = setup_pool().await;
    let alice = customer(&db, "alice", "900000001").await;
    let bob = customer(&db, "bob", "900000002").await;
    let a = card(&db, alice, 1_000).await;
    let b = card(&db, bob, 1_000).await;

    let to_a = recipient(&db, a.account_number).await;
    let to_b = recipient(&db, b.account_number).await;
    let engine = TransferEngine::new(db.clone());
    let a_id = AccountId::new(a.id);
    let b_id = AccountId::new(b.id);

    let handles: Vec<_> = (0..ROUNDS)
        .map(|i| {
            let engine = engine.clone();
            let (sender, target) = if i % 2 == 0 { (a_id, to_b) } else { (b_id, to_a) };
            let amount = Amount::new(i + 1);
            tokio::spawn(async move { (amount, engine.transfer(sender, &target, amount).await) })
        })
        .collect();

    let mut moved = 0;
    let mut committed = 0;
    for result in join_all(handles).await {
        let (amount, result) = result.expect("Task panicked");
        match result {
            Ok(outcome) => {
                assert!(outcome.is_completed());
                moved += amount.units();
                committed += 1;
            }
            Err(err) => assert!(err.is_retryable(), "transfer failed for good: {err}"),
        }
    }

    assert!(committed > 0);
    assert_eq!(balance(&db, a_id).await + balance(&db, b_id).await, 2_000);
    assert_eq!(pooled_total(&db).await, moved);
    assert_eq!(log_len(&db).await, committed * 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_never_overdraw() {
    let (_dir, db) = setup_pool().await;
    let alice = customer(&db, "alice", "900000001").await;
    let bob = customer(&db, "bob", "900000002").await;
    let a = card(&db, alice, 100).await;
    let b = card(&db, bob, 0).await;

    let target = recipient(&db, b.account_number).await;
    let engine = TransferEngine::new(db.clone());
    let a_id = AccountId::new(a.id);

    let handles: Vec<_> = (0..30)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.transfer(a_id, &target, Amount::new(10)).await })
        })
        .collect();

    let mut completed = 0;
    let mut rejected = 0;
    for result in join_all(handles).await {
        match result.expect("Task panicked") {
            Ok(TransferOutcome::Completed(_)) => completed += 1,
            Ok(TransferOutcome::Rejected(_)) => rejected += 1,
            Err(err) => assert!(err.is_retryable(), "transfer failed for good: {err}"),
        }
    }

    assert!(completed <= 10);
    // A rejection is only possible once the card has been drained.
    if rejected > 0 {
        assert_eq!(completed, 10);
    }
    assert_eq!(balance(&db, a_id).await, 100 - 10 * completed);
    assert_eq!(balance(&db, AccountId::new(b.id)).await, 10 * completed);
    assert_eq!(pooled_total(&db).await, 10 * completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_statistics_snapshot_is_consistent_during_payments() {
    let (_dir, db) = setup_pool().await;
    let alice = customer(&db, "alice", "900000001").await;
    let bob = customer(&db, "bob", "900000002").await;
    let a = card(&db, alice, 1_000).await;
    let b = card(&db, bob, 1_000).await;
    ServiceRepository::new(db.clone())
        .create_service("Water")
        .await
        .unwrap();

    let to_b = recipient(&db, b.account_number).await;
    let engine = TransferEngine::new(db.clone());
    let stats = StatisticsRepository::new(db.clone());
    let a_id = AccountId::new(a.id);

    let payments: Vec<_> = (0..ROUNDS)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    engine.transfer(a_id, &to_b, Amount::new(7)).await.map(|_| ())
                } else {
                    engine
                        .transfer_to_service(a_id, "Water", Amount::new(5))
                        .await
                        .map(|_| ())
                }
            })
        })
        .collect();
    let snapshots: Vec<_> = (0..ROUNDS)
        .map(|_| {
            let stats = stats.clone();
            tokio::spawn(async move { stats.snapshot().await })
        })
        .collect();

    let (payments, snapshots) = futures::join!(join_all(payments), join_all(snapshots));

    for result in payments {
        if let Err(err) = result.expect("Task panicked") {
            assert!(err.is_retryable(), "payment failed for good: {err}");
        }
    }

    let mut consistent = 0;
    for result in snapshots {
        match result.expect("Task panicked") {
            Ok(snapshot) => {
                let held = snapshot.card_balance_total.units() + snapshot.service_balance_total.units();
                assert_eq!(held, 2_000, "snapshot saw a partial unit of work: {snapshot:?}");
                consistent += 1;
            }
            Err(StatisticsError::Database(err)) => {
                assert!(is_retryable(&err), "snapshot failed for good: {err}");
            }
            Err(err) => panic!("unexpected snapshot error: {err}"),
        }
    }
    assert!(consistent > 0);
}
