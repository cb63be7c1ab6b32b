//! Store error classification and conversion into [`AppError`].

use ibank_core::ledger::LedgerError;
use ibank_shared::{AppError, ErrorCategory};
use sea_orm::{ConnAcquireErr, DbErr, RuntimeErr, SqlErr};

use crate::repositories::{
    AuthError, CardError, CatalogError, RosterError, StatisticsError, TransferError, UserError,
};

/// SQLSTATE and SQLite result codes for aborts that a fresh attempt can clear:
/// Postgres serialization failure and deadlock, SQLite busy, locked and busy
/// snapshot.
const RETRYABLE_CODES: [&str; 5] = ["40001", "40P01", "5", "6", "517"];

/// Returns true if re-running the whole unit of work may succeed.
#[must_use]
pub fn is_retryable(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => true,
        DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx_err)) => match sqlx_err {
            sqlx::Error::Database(db_err) => db_err
                .code()
                .is_some_and(|code| RETRYABLE_CODES.contains(&&*code)),
            sqlx::Error::PoolTimedOut => true,
            _ => false,
        },
        _ => false,
    }
}

/// Returns the driver message if `err` is a unique constraint violation.
pub(crate) fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Some(message),
        _ => None,
    }
}

/// Folds a raw store error into [`AppError`], keeping its retry flag.
#[must_use]
pub fn store_error(err: &DbErr) -> AppError {
    AppError::Database {
        message: err.to_string(),
        retryable: is_retryable(err),
    }
}

/// Maps a ledger error to the boundary variant of its category.
fn ledger_error(err: &LedgerError) -> AppError {
    let message = err.to_string();
    match err.category() {
        ErrorCategory::ValidationFailure => AppError::Validation(message),
        ErrorCategory::ResolutionFailure => AppError::NotFound(message),
        ErrorCategory::PolicyRejection => AppError::BusinessRule(message),
        ErrorCategory::StoreFailure => AppError::Internal(message),
        ErrorCategory::AccessDenied => AppError::Forbidden(message),
        ErrorCategory::Conflict => AppError::Conflict(message),
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Database(e) => store_error(&e),
            TransferError::PooledTotalMissing => Self::Internal(err.to_string()),
            TransferError::Ledger(e) => ledger_error(&e),
        }
    }
}

impl From<CardError> for AppError {
    fn from(err: CardError) -> Self {
        match err {
            CardError::Database(e) => store_error(&e),
            CardError::Conflict(message) => Self::Database {
                message,
                retryable: true,
            },
            CardError::Ledger(e) => ledger_error(&e),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Database(e) => store_error(&e),
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::DuplicateLogin(_)
            | UserError::DuplicatePassport(_)
            | UserError::Conflict(_) => Self::Conflict(err.to_string()),
            UserError::InvalidPhone(_) => Self::Validation(err.to_string()),
            UserError::Password(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => store_error(&e),
            AuthError::UnknownLogin(_) | AuthError::InvalidPassword => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::Suspended(_) => Self::Forbidden(err.to_string()),
            AuthError::DuplicateLogin(_) => Self::Conflict(err.to_string()),
            AuthError::Password(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Database(e) => store_error(&e),
            CatalogError::DuplicateName(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Database(e) => store_error(&e),
            RosterError::Conflict(_) => Self::Conflict(err.to_string()),
            RosterError::InvalidRecord(_) => Self::Validation(err.to_string()),
            RosterError::Io(_) | RosterError::Json(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<StatisticsError> for AppError {
    fn from(err: StatisticsError) -> Self {
        match err {
            StatisticsError::Database(e) => store_error(&e),
            StatisticsError::TotalOverflow(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibank_shared::types::{AccountId, Amount};

    #[test]
    fn test_acquire_timeout_is_retryable() {
        assert!(is_retryable(&DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)));
        assert!(!is_retryable(&DbErr::RecordNotFound("card".into())));
        assert!(!is_retryable(&DbErr::Custom("boom".into())));
    }

    #[test]
    fn test_transfer_error_mapping() {
        let err: AppError = TransferError::Ledger(LedgerError::AccountNotFound(AccountId::new(9))).into();
        assert_eq!(err.category(), ErrorCategory::ResolutionFailure);

        let err: AppError = TransferError::Ledger(LedgerError::InvalidAmount(Amount::new(-1))).into();
        assert_eq!(err.category(), ErrorCategory::ValidationFailure);

        let err: AppError = TransferError::Database(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)).into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::StoreFailure);
    }

    #[test]
    fn test_overflow_is_not_reported_as_validation() {
        let err: AppError = TransferError::Ledger(LedgerError::PooledTotalOverflow).into();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.category(), ErrorCategory::StoreFailure);

        let err: AppError = TransferError::Ledger(LedgerError::BalanceOverflow(AccountId::new(2))).into();
        assert_eq!(err.category(), ErrorCategory::StoreFailure);

        let err: AppError = CardError::Ledger(LedgerError::AccountNumberSpaceExhausted).into();
        assert_eq!(err.category(), ErrorCategory::StoreFailure);

        let err: AppError = CardError::Ledger(LedgerError::NegativeOpeningBalance(Amount::new(-3))).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_card_conflict_is_retryable() {
        let err: AppError = CardError::Conflict("duplicate".into()).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: AppError = AuthError::Suspended("anna".into()).into();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err: AppError = AuthError::InvalidPassword.into();
        assert_eq!(err.category(), ErrorCategory::AccessDenied);
    }
}
