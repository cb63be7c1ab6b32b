//! Card number issuance.
//!
//! A new card takes the slot after the highest existing card id, and its
//! account number is that id offset by [`ACCOUNT_NUMBER_BASE`].

use ibank_shared::types::{AccountId, AccountNumber};

use super::error::LedgerError;

/// Offset added to a card id to form its account number.
pub const ACCOUNT_NUMBER_BASE: i64 = 20_216_000_000_000_000;

/// A card id and account number reserved for a new card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSlot {
    /// Internal card id.
    pub id: AccountId,
    /// Issued account number.
    pub number: AccountNumber,
}

/// Computes the next card slot from the highest existing card id.
///
/// # Errors
///
/// Returns `LedgerError::AccountNumberSpaceExhausted` if the id or account
/// number would overflow.
pub fn next_card_slot(max_id: Option<AccountId>) -> Result<CardSlot, LedgerError> {
    let next = max_id
        .map_or(0, AccountId::get)
        .checked_add(1)
        .ok_or(LedgerError::AccountNumberSpaceExhausted)?;
    let number = ACCOUNT_NUMBER_BASE
        .checked_add(next)
        .ok_or(LedgerError::AccountNumberSpaceExhausted)?;

    Ok(CardSlot {
        id: AccountId::new(next),
        number: AccountNumber::new(number),
    })
}
