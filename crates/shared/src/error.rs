//! Application-wide error types.
//!
//! Library crates keep their own precise error enums. Binaries and other
//! outer layers fold them into [`AppError`], which still tells the caller which
//! of the failure kinds occurred.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// The failure kinds a caller must be able to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// An expected refusal such as insufficient funds. No state changed.
    PolicyRejection,
    /// A recipient, account, or service could not be resolved. No state changed.
    ResolutionFailure,
    /// Malformed input rejected before any store access.
    ValidationFailure,
    /// The store failed; the unit of work was rolled back.
    StoreFailure,
    /// Authentication failed or the user is suspended.
    AccessDenied,
    /// A uniqueness rule was violated.
    Conflict,
}

impl ErrorCategory {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PolicyRejection => "POLICY_REJECTION",
            Self::ResolutionFailure => "RESOLUTION_FAILURE",
            Self::ValidationFailure => "VALIDATION_FAILURE",
            Self::StoreFailure => "STORE_FAILURE",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Conflict => "CONFLICT",
        }
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The user is suspended by a manager.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Recipient, account, or service not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule refusal (insufficient funds).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {message}")]
    Database {
        /// Driver message.
        message: String,
        /// Whether re-running the whole unit of work may succeed.
        retryable: bool,
    },

    /// Internal error (I/O, serialization, configuration).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized(_) | Self::Forbidden(_) => ErrorCategory::AccessDenied,
            Self::NotFound(_) => ErrorCategory::ResolutionFailure,
            Self::Validation(_) => ErrorCategory::ValidationFailure,
            Self::BusinessRule(_) => ErrorCategory::PolicyRejection,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::Database { .. } | Self::Internal(_) => ErrorCategory::StoreFailure,
        }
    }

    /// Returns the error code for logs and operator output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the operation may be re-invoked as a whole.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database { retryable: true, .. })
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Internal(format!("configuration: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("io: {err}"))
    }
}
