//! Authentication for customers and managers.
//!
//! Customer logins go through the access gate before the password is checked.

use chrono::Utc;
use ibank_core::access::Visibility;
use ibank_core::auth::{
    LoginError, PasswordError, Session, check_customer_login, check_password, hash_password,
};
use ibank_shared::ErrorCategory;
use ibank_shared::types::{ManagerId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info};

use crate::entities::{managers, users};
use crate::error::unique_violation;

/// Error types for authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No account with this login.
    #[error("Unknown login: {0}")]
    UnknownLogin(String),

    /// Wrong password.
    #[error("Invalid password")]
    InvalidPassword,

    /// Customer hidden by a manager.
    #[error("Access suspended for {0}")]
    Suspended(String),

    /// Manager login already taken.
    #[error("Login already registered: {0}")]
    DuplicateLogin(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AuthError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownLogin(_) | Self::InvalidPassword | Self::Suspended(_) => {
                ErrorCategory::AccessDenied
            }
            Self::DuplicateLogin(_) => ErrorCategory::Conflict,
            Self::Password(_) | Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }

    fn from_login(err: LoginError, login: &str) -> Self {
        match err {
            LoginError::Suspended => Self::Suspended(login.to_string()),
            LoginError::InvalidPassword => Self::InvalidPassword,
            LoginError::Password(e) => Self::Password(e),
        }
    }
}

/// Authentication repository.
#[derive(Debug, Clone)]
pub struct AuthRepository {
    db: DatabaseConnection,
}

impl AuthRepository {
    /// Creates a new authentication repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Logs a customer in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownLogin`, `AuthError::Suspended` for hidden
    /// customers whatever the password, or `AuthError::InvalidPassword`.
    pub async fn login_user(&self, login: &str, password: &str) -> Result<Session, AuthError> {
        let user = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await?
            .ok_or_else(|| AuthError::UnknownLogin(login.to_string()))?;

        check_customer_login(Visibility::from(user.visibility), password, &user.password_hash)
            .map_err(|e| {
                debug!(login, error = %e, "customer login refused");
                AuthError::from_login(e, login)
            })?;

        info!(user_id = user.id, login, "customer logged in");
        Ok(Session::customer(UserId::new(user.id), login))
    }

    /// Logs a manager in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownLogin` or `AuthError::InvalidPassword`.
    pub async fn login_manager(&self, login: &str, password: &str) -> Result<Session, AuthError> {
        let manager = self
            .find_manager_by_login(login)
            .await?
            .ok_or_else(|| AuthError::UnknownLogin(login.to_string()))?;

        check_password(password, &manager.password_hash)
            .map_err(|e| AuthError::from_login(e, login))?;

        info!(manager_id = manager.id, login, "manager logged in");
        Ok(Session::manager(ManagerId::new(manager.id), login))
    }

    /// Registers a manager.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateLogin` if the login is taken.
    pub async fn create_manager(
        &self,
        name: &str,
        login: &str,
        password: &str,
    ) -> Result<managers::Model, AuthError> {
        let password_hash = hash_password(password)?;
        let manager = managers::ActiveModel {
            name: Set(name.to_string()),
            login: Set(login.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AuthError::DuplicateLogin(login.to_string()),
            None => AuthError::Database(e),
        })?;

        info!(manager_id = manager.id, login, "registered manager");
        Ok(manager)
    }

    /// Finds a manager by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_manager_by_login(
        &self,
        login: &str,
    ) -> Result<Option<managers::Model>, DbErr> {
        managers::Entity::find()
            .filter(managers::Column::Login.eq(login))
            .one(&self.db)
            .await
    }
}
