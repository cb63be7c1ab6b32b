//! Transfer engine: the only writer of balances, the pooled transfer total
//! and the operation log.
//!
//! Each transfer is one `DatabaseTransaction`. Card rows are locked in
//! ascending id order and the pooled-total row after them, so two transfers
//! never wait on each other in opposite orders. Any error after the funds
//! check rolls everything back.

use chrono::Utc;
use ibank_core::ledger::{
    LedgerError, ServicePaymentReceipt, TransferOutcome, TransferReceipt, TransferSide,
    bump_pooled_total, card_transfer_entries, credit_account, credit_service, debit,
    service_payment_entry, validate_amount,
};
use ibank_shared::ErrorCategory;
use ibank_shared::types::{AccountId, AccountNumber, Amount, ServiceId, UserId};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QuerySelect, sea_query::Expr,
};
use tracing::{debug, info, warn};

use super::operation_log;
use super::resolver::ResolvedRecipient;
use crate::entities::{cards, pooled_transfer_total, services};
use crate::error::is_retryable;
use crate::unit_of_work;

/// Error types for transfers and recipient resolution.
///
/// Insufficient funds is not an error; see [`TransferOutcome::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Validation or resolution failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The pooled-total singleton row is absent.
    #[error("Pooled transfer total row is missing")]
    PooledTotalMissing,

    /// Database error. The unit of work was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TransferError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Ledger(e) => e.category(),
            Self::PooledTotalMissing | Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }

    /// Returns true if re-running the whole transfer may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(e) => is_retryable(e),
            Self::Ledger(_) | Self::PooledTotalMissing => false,
        }
    }
}

/// The transfer engine.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    db: DatabaseConnection,
}

impl TransferEngine {
    /// Creates a new transfer engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves `amount` from the `sender` card to a resolved recipient card.
    ///
    /// Debits the sender, credits the recipient, bumps the pooled total and
    /// appends one entry per side, all in one unit of work. Amount zero runs
    /// the whole unit of work and changes no balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` for negative amounts before any
    /// store access, `LedgerError::AccountNotFound` if a card is missing, and
    /// `TransferError::Database` after a rollback.
    pub async fn transfer(
        &self,
        sender: AccountId,
        recipient: &ResolvedRecipient,
        amount: Amount,
    ) -> Result<TransferOutcome<TransferReceipt>, TransferError> {
        let amount = validate_amount(amount)?;

        let txn = unit_of_work::begin_write(&self.db).await?;
        let outcome = transfer_in(&txn, sender, recipient.account(), amount).await;
        let outcome = finish(txn, outcome).await?;

        match &outcome {
            TransferOutcome::Completed(receipt) => info!(
                sender = %receipt.sender,
                recipient = %receipt.recipient,
                amount = %receipt.amount,
                sender_balance = %receipt.sender_balance,
                recipient_balance = %receipt.recipient_balance,
                pooled_total = %receipt.pooled_total,
                "transfer committed"
            ),
            TransferOutcome::Rejected(rejection) => {
                debug!(%sender, recipient = %recipient.account(), %rejection, "transfer rejected");
            }
        }
        Ok(outcome)
    }

    /// Pays `amount` from the `sender` card to the named service.
    ///
    /// Same shape as [`transfer`](Self::transfer) but credits the service,
    /// appends a single entry and leaves the pooled total alone.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ServiceNotFound` for an unknown service and the
    /// same errors as [`transfer`](Self::transfer) otherwise.
    pub async fn transfer_to_service(
        &self,
        sender: AccountId,
        service_name: &str,
        amount: Amount,
    ) -> Result<TransferOutcome<ServicePaymentReceipt>, TransferError> {
        let amount = validate_amount(amount)?;

        let txn = unit_of_work::begin_write(&self.db).await?;
        let outcome = pay_service_in(&txn, sender, service_name, amount).await;
        let outcome = finish(txn, outcome).await?;

        match &outcome {
            TransferOutcome::Completed(receipt) => info!(
                sender = %receipt.sender,
                service = %receipt.service_name,
                amount = %receipt.amount,
                sender_balance = %receipt.sender_balance,
                service_balance = %receipt.service_balance,
                "service payment committed"
            ),
            TransferOutcome::Rejected(rejection) => {
                debug!(%sender, service = service_name, %rejection, "service payment rejected");
            }
        }
        Ok(outcome)
    }
}

/// Commits a completed unit of work and rolls back anything else.
async fn finish<R>(
    txn: DatabaseTransaction,
    outcome: Result<TransferOutcome<R>, TransferError>,
) -> Result<TransferOutcome<R>, TransferError> {
    match outcome {
        Ok(TransferOutcome::Completed(receipt)) => {
            txn.commit().await?;
            Ok(TransferOutcome::Completed(receipt))
        }
        Ok(rejected) => {
            rollback(txn).await;
            Ok(rejected)
        }
        Err(err) => {
            rollback(txn).await;
            Err(err)
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(err) = txn.rollback().await {
        warn!(error = %err, "rollback failed");
    }
}

async fn transfer_in(
    txn: &DatabaseTransaction,
    sender: AccountId,
    recipient: AccountId,
    amount: Amount,
) -> Result<TransferOutcome<TransferReceipt>, TransferError> {
    lock_cards(txn, &[sender, recipient]).await?;

    // 1. funds check
    let sender_card = read_card(txn, sender).await?;
    let sender_balance = match debit(sender, Amount::new(sender_card.balance), amount) {
        Ok(balance) => balance,
        Err(rejection) => return Ok(TransferOutcome::Rejected(rejection)),
    };

    // 2. debit
    write_balance(txn, sender, sender_balance).await?;

    // 3. credit, re-reading so a self-transfer sees its own debit
    let recipient_card = read_card(txn, recipient).await?;
    let recipient_balance = credit_account(recipient, Amount::new(recipient_card.balance), amount)?;
    write_balance(txn, recipient, recipient_balance).await?;

    // 4. pooled total
    let pooled = pooled_transfer_total::Entity::find_by_id(pooled_transfer_total::SINGLETON_ID)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(TransferError::PooledTotalMissing)?;
    let pooled_total = bump_pooled_total(Amount::new(pooled.total), amount)?;
    pooled_transfer_total::Entity::update_many()
        .col_expr(pooled_transfer_total::Column::Total, Expr::value(pooled_total.units()))
        .filter(pooled_transfer_total::Column::Id.eq(pooled_transfer_total::SINGLETON_ID))
        .exec(txn)
        .await?;

    // 5. dual-entry log
    let recorded_at = Utc::now();
    let sender_side = side(&sender_card);
    let recipient_side = side(&recipient_card);
    for entry in card_transfer_entries(sender_side, recipient_side, amount, recorded_at) {
        operation_log::append(txn, entry).await?;
    }

    Ok(TransferOutcome::Completed(TransferReceipt {
        sender,
        sender_number: sender_side.number,
        recipient,
        recipient_number: recipient_side.number,
        amount,
        sender_balance,
        recipient_balance,
        pooled_total,
        recorded_at,
    }))
}

async fn pay_service_in(
    txn: &DatabaseTransaction,
    sender: AccountId,
    service_name: &str,
    amount: Amount,
) -> Result<TransferOutcome<ServicePaymentReceipt>, TransferError> {
    lock_cards(txn, &[sender]).await?;

    let service = services::Entity::find()
        .filter(services::Column::Name.eq(service_name))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| LedgerError::ServiceNotFound(service_name.to_string()))?;

    let sender_card = read_card(txn, sender).await?;
    let sender_balance = match debit(sender, Amount::new(sender_card.balance), amount) {
        Ok(balance) => balance,
        Err(rejection) => return Ok(TransferOutcome::Rejected(rejection)),
    };

    write_balance(txn, sender, sender_balance).await?;

    let service_balance = credit_service(&service.name, Amount::new(service.balance), amount)?;
    services::Entity::update_many()
        .col_expr(services::Column::Balance, Expr::value(service_balance.units()))
        .filter(services::Column::Id.eq(service.id))
        .exec(txn)
        .await?;

    let recorded_at = Utc::now();
    operation_log::append(
        txn,
        service_payment_entry(UserId::new(sender_card.owner_id), &service.name, amount, recorded_at),
    )
    .await?;

    Ok(TransferOutcome::Completed(ServicePaymentReceipt {
        sender,
        service: ServiceId::new(service.id),
        service_name: service.name,
        amount,
        sender_balance,
        service_balance,
        recorded_at,
    }))
}

/// Takes row locks on the given cards in ascending id order.
///
/// Missing cards are skipped here and reported by the step that reads them.
async fn lock_cards(txn: &DatabaseTransaction, ids: &[AccountId]) -> Result<(), DbErr> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    for id in ids {
        cards::Entity::find_by_id(id.get())
            .lock_exclusive()
            .one(txn)
            .await?;
    }
    Ok(())
}

async fn read_card(txn: &DatabaseTransaction, id: AccountId) -> Result<cards::Model, TransferError> {
    cards::Entity::find_by_id(id.get())
        .one(txn)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(id).into())
}

async fn write_balance(
    txn: &DatabaseTransaction,
    id: AccountId,
    balance: Amount,
) -> Result<(), TransferError> {
    let result = cards::Entity::update_many()
        .col_expr(cards::Column::Balance, Expr::value(balance.units()))
        .filter(cards::Column::Id.eq(id.get()))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(LedgerError::AccountNotFound(id).into());
    }
    Ok(())
}

fn side(card: &cards::Model) -> TransferSide {
    TransferSide {
        owner: UserId::new(card.owner_id),
        number: AccountNumber::new(card.account_number),
    }
}
