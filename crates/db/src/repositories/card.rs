//! Card repository: the account store and the card issuer.

use chrono::Utc;
use ibank_core::ledger::{LedgerError, next_card_slot, validate_opening_balance};
use ibank_shared::ErrorCategory;
use ibank_shared::types::{AccountId, AccountNumber, Amount, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, warn};

use crate::entities::{cards, users};
use crate::error::{is_retryable, unique_violation};
use crate::unit_of_work;

/// Error types for card operations.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// Owner missing, negative opening balance, or number space exhausted.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A concurrent issuance took the same slot. Retry the whole operation.
    #[error("Card number already issued, please retry: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CardError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Ledger(e) => e.category(),
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }

    /// Returns true if re-running the issuance may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Database(e) => is_retryable(e),
            Self::Ledger(_) => false,
        }
    }
}

/// Card repository.
#[derive(Debug, Clone)]
pub struct CardRepository {
    db: DatabaseConnection,
}

impl CardRepository {
    /// Creates a new card repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a card to an existing user.
    ///
    /// The account number is allocated in the same unit of work as the insert.
    /// If the read of the highest card id fails, no card is created.
    ///
    /// # Errors
    ///
    /// Returns `CardError::Ledger` if the owner does not exist or the opening
    /// balance is negative, and `CardError::Conflict` if a concurrent issuance
    /// committed the same slot first.
    pub async fn issue_card(
        &self,
        owner: UserId,
        display_name: &str,
        opening_balance: Amount,
    ) -> Result<cards::Model, CardError> {
        let opening_balance = validate_opening_balance(opening_balance)?;

        let txn = unit_of_work::begin_write(&self.db).await?;
        match issue_in(&txn, owner, display_name, opening_balance).await {
            Ok(card) => {
                txn.commit().await.map_err(map_insert_error)?;
                info!(
                    card_id = card.id,
                    account_number = card.account_number,
                    owner_id = card.owner_id,
                    "issued card"
                );
                Ok(card)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed issuance failed");
                }
                Err(err)
            }
        }
    }

    /// Finds a card by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<cards::Model>, DbErr> {
        cards::Entity::find_by_id(id.get()).one(&self.db).await
    }

    /// Finds a card by account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_number(
        &self,
        number: AccountNumber,
    ) -> Result<Option<cards::Model>, DbErr> {
        find_by_number(&self.db, number).await
    }

    /// Lists a user's cards, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<cards::Model>, DbErr> {
        cards::Entity::find()
            .filter(cards::Column::OwnerId.eq(owner.get()))
            .order_by_asc(cards::Column::Id)
            .all(&self.db)
            .await
    }

    /// Lists all cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<cards::Model>, DbErr> {
        cards::Entity::find()
            .order_by_asc(cards::Column::Id)
            .all(&self.db)
            .await
    }
}

async fn issue_in(
    txn: &DatabaseTransaction,
    owner: UserId,
    display_name: &str,
    opening_balance: Amount,
) -> Result<cards::Model, CardError> {
    users::Entity::find_by_id(owner.get())
        .one(txn)
        .await?
        .ok_or(LedgerError::UserNotFound(owner))?;

    let max_id: Option<i64> = cards::Entity::find()
        .select_only()
        .column_as(cards::Column::Id.max(), "max_id")
        .into_tuple::<Option<i64>>()
        .one(txn)
        .await?
        .flatten();

    let slot = next_card_slot(max_id.map(AccountId::new))?;

    cards::ActiveModel {
        id: Set(slot.id.get()),
        account_number: Set(slot.number.get()),
        display_name: Set(display_name.to_string()),
        balance: Set(opening_balance.units()),
        owner_id: Set(owner.get()),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await
    .map_err(map_insert_error)
}

fn map_insert_error(err: DbErr) -> CardError {
    match unique_violation(&err) {
        Some(message) => CardError::Conflict(message),
        None => CardError::Database(err),
    }
}

pub(crate) async fn find_by_number<C: ConnectionTrait>(
    conn: &C,
    number: AccountNumber,
) -> Result<Option<cards::Model>, DbErr> {
    cards::Entity::find()
        .filter(cards::Column::AccountNumber.eq(number.get()))
        .one(conn)
        .await
}
