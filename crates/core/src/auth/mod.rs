//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - The login check, which consults the access gate before the password
//! - Sessions threaded through callers instead of a global current user

mod password;
mod session;

pub use password::{PasswordError, hash_password, verify_password};
pub use session::{Principal, Session};

use thiserror::Error;

use crate::access::Visibility;

/// Reasons a login check fails once the account has been found.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The customer is hidden by a manager.
    #[error("account is suspended")]
    Suspended,

    /// The password does not match.
    #[error("invalid password")]
    InvalidPassword,

    /// The stored hash could not be checked.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Checks a customer login against the access gate and the stored hash.
///
/// A hidden customer is refused regardless of the password, and the hash is
/// never evaluated for them.
///
/// # Errors
///
/// Returns `LoginError::Suspended` for hidden customers and
/// `LoginError::InvalidPassword` for a wrong password.
pub fn check_customer_login(
    visibility: Visibility,
    password: &str,
    stored_hash: &str,
) -> Result<(), LoginError> {
    if visibility.is_hidden() {
        return Err(LoginError::Suspended);
    }
    check_password(password, stored_hash)
}

/// Checks a password against a stored hash.
///
/// # Errors
///
/// Returns `LoginError::InvalidPassword` for a wrong password.
pub fn check_password(password: &str, stored_hash: &str) -> Result<(), LoginError> {
    if verify_password(password, stored_hash)? {
        Ok(())
    } else {
        Err(LoginError::InvalidPassword)
    }
}
