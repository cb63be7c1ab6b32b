//! Customer-facing identifiers: issued account numbers and phone numbers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing customer-facing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    /// Account numbers are plain positive digit strings.
    #[error("invalid account number: {0:?}")]
    AccountNumber(String),

    /// Phone numbers are digits with an optional leading `+`.
    #[error("invalid phone number: {0:?}")]
    PhoneNumber(String),
}

/// The number printed on a card and used to address transfers.
///
/// Distinct from the internal [`AccountId`](super::AccountId): it lives in a
/// separate, much larger value range and never changes once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(i64);

impl AccountNumber {
    /// Wraps a raw account number.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw account number.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountNumber {
    type Err = NumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NumberParseError::AccountNumber(s.to_string()));
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| NumberParseError::AccountNumber(s.to_string()))
    }
}

/// A customer phone number, stored normalized (no spaces, dashes or brackets).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalizes and validates a phone number.
    ///
    /// Separators (`' '`, `-`, `(`, `)`) are dropped. What remains must be
    /// 5 to 15 digits with an optional leading `+`.
    pub fn parse(raw: &str) -> Result<Self, NumberParseError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

        if !(5..=15).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NumberParseError::PhoneNumber(raw.to_string()));
        }
        Ok(Self(cleaned))
    }

    /// Returns the normalized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = NumberParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = NumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn test_account_number_parse() {
        let number = AccountNumber::from_str("20216000000000001").unwrap();
        assert_eq!(number.get(), 20_216_000_000_000_001);
        assert_eq!(number.to_string(), "20216000000000001");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("-20216000000000001")]
    #[case("2021600000000000a")]
    #[case("99999999999999999999999")]
    fn test_account_number_rejects(#[case] raw: &str) {
        assert!(AccountNumber::from_str(raw).is_err());
    }

    #[rstest]
    #[case("+992 (93) 555-12-34", "+992935551234")]
    #[case("935551234", "935551234")]
    #[case(" 12345 ", "12345")]
    fn test_phone_number_normalizes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(PhoneNumber::parse(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1234")]
    #[case("+")]
    #[case("93-555-ab-34")]
    #[case("1234567890123456")]
    fn test_phone_number_rejects(#[case] raw: &str) {
        assert!(matches!(
            PhoneNumber::parse(raw),
            Err(NumberParseError::PhoneNumber(_))
        ));
    }
}
