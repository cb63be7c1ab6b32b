//! Recipient resolution: phone number or account number to one card.
//!
//! A [`ResolvedRecipient`] can only be produced here, so every transfer starts
//! from a target that existed when it was resolved.

use ibank_core::ledger::LedgerError;
use ibank_shared::types::{AccountId, AccountNumber, PhoneNumber, UserId};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::card::find_by_number;
use super::transfer::TransferError;
use crate::entities::{cards, users};

/// A card that a transfer may credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRecipient {
    account: AccountId,
    number: AccountNumber,
    owner: UserId,
}

impl ResolvedRecipient {
    pub(crate) const fn new(account: AccountId, number: AccountNumber, owner: UserId) -> Self {
        Self {
            account,
            number,
            owner,
        }
    }

    fn from_card(card: &cards::Model) -> Self {
        Self::new(
            AccountId::new(card.id),
            AccountNumber::new(card.account_number),
            UserId::new(card.owner_id),
        )
    }

    /// Target card.
    #[must_use]
    pub const fn account(&self) -> AccountId {
        self.account
    }

    /// Target account number.
    #[must_use]
    pub const fn number(&self) -> AccountNumber {
        self.number
    }

    /// Owner of the target card.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }
}

/// Resolves transfer recipients.
#[derive(Debug, Clone)]
pub struct RecipientResolver {
    db: DatabaseConnection,
}

impl RecipientResolver {
    /// Creates a new resolver.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the card of the user registered with `phone`.
    ///
    /// With several matching users the lowest user id wins; a user with
    /// several cards resolves to the lowest card id.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::RecipientNotFound` if no user has this phone and
    /// `LedgerError::RecipientHasNoAccount` if the user owns no card.
    pub async fn resolve_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<ResolvedRecipient, TransferError> {
        let user = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone.as_str()))
            .order_by_asc(users::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::RecipientNotFound(phone.clone()))?;

        let card = cards::Entity::find()
            .filter(cards::Column::OwnerId.eq(user.id))
            .order_by_asc(cards::Column::Id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::RecipientHasNoAccount(UserId::new(user.id)))?;

        debug!(%phone, user_id = user.id, card_id = card.id, "resolved recipient by phone");
        Ok(ResolvedRecipient::from_card(&card))
    }

    /// Resolves the card carrying `number`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAccountNumber` if no card matches.
    pub async fn resolve_by_account_number(
        &self,
        number: AccountNumber,
    ) -> Result<ResolvedRecipient, TransferError> {
        let card = find_by_number(&self.db, number)
            .await?
            .ok_or(LedgerError::InvalidAccountNumber(number))?;

        debug!(%number, card_id = card.id, "resolved recipient by account number");
        Ok(ResolvedRecipient::from_card(&card))
    }
}
