//! User repository: the customer directory and the access gate.

use chrono::Utc;
use ibank_core::access::Visibility;
use ibank_core::auth::{PasswordError, hash_password};
use ibank_shared::ErrorCategory;
use ibank_shared::types::{NumberParseError, PhoneNumber, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use tracing::info;

use crate::entities::{sea_orm_active_enums, users};
use crate::error::unique_violation;

/// Error types for user directory operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// No user with this id.
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Login already taken.
    #[error("Login already registered: {0}")]
    DuplicateLogin(String),

    /// Passport series already registered.
    #[error("Passport series already registered: {0}")]
    DuplicatePassport(String),

    /// A concurrent insert won the uniqueness race.
    #[error("Conflicting user record: {0}")]
    Conflict(String),

    /// Phone number is malformed.
    #[error(transparent)]
    InvalidPhone(#[from] NumberParseError),

    /// Password could not be hashed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl UserError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::ResolutionFailure,
            Self::DuplicateLogin(_) | Self::DuplicatePassport(_) | Self::Conflict(_) => {
                ErrorCategory::Conflict
            }
            Self::InvalidPhone(_) => ErrorCategory::ValidationFailure,
            Self::Password(_) | Self::Database(_) => ErrorCategory::StoreFailure,
        }
    }
}

/// Input for registering a customer.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Full name.
    pub name: String,
    /// Unique login.
    pub login: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Unique passport series.
    pub passport_series: String,
    /// Contact phone, raw input.
    pub phone_number: String,
}

/// User repository for the customer directory.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a customer. New customers start visible.
    ///
    /// # Errors
    ///
    /// Returns `UserError::DuplicateLogin` or `UserError::DuplicatePassport`
    /// if either is taken, `UserError::InvalidPhone` for a malformed phone.
    pub async fn create_user(&self, input: NewUser) -> Result<users::Model, UserError> {
        let phone = PhoneNumber::parse(&input.phone_number)?;

        if self.find_by_login(&input.login).await?.is_some() {
            return Err(UserError::DuplicateLogin(input.login));
        }
        if self.passport_exists(&input.passport_series).await? {
            return Err(UserError::DuplicatePassport(input.passport_series));
        }

        let password_hash = hash_password(&input.password)?;
        let user = insert_user(
            &self.db,
            UserRow {
                name: input.name,
                login: input.login,
                password_hash,
                passport_series: input.passport_series,
                phone_number: phone.into(),
                visibility: Visibility::Visible,
            },
        )
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(message) => UserError::Conflict(message),
            None => UserError::Database(e),
        })?;

        info!(user_id = user.id, login = %user.login, "registered customer");
        Ok(user)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.get()).one(&self.db).await
    }

    /// Finds a user by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await
    }

    /// Finds the lowest-id user with this phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone.as_str()))
            .order_by_asc(users::Column::Id)
            .one(&self.db)
            .await
    }

    /// Lists every user registered with this phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_by_phone(&self, phone: &PhoneNumber) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone.as_str()))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
    }

    /// Lists all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
    }

    /// Lists users with the given visibility.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_visibility(
        &self,
        visibility: Visibility,
    ) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Visibility.eq(sea_orm_active_enums::Visibility::from(visibility)))
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
    }

    /// Sets a user's visibility. Single-row update.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if no user has this id.
    pub async fn set_visibility(&self, id: UserId, visibility: Visibility) -> Result<(), UserError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Visibility,
                Expr::value(sea_orm_active_enums::Visibility::from(visibility)),
            )
            .filter(users::Column::Id.eq(id.get()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = %id, %visibility, "changed customer visibility");
        Ok(())
    }

    /// Flips a user's visibility and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if no user has this id.
    pub async fn toggle_visibility(&self, id: UserId) -> Result<Visibility, UserError> {
        let user = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;
        let next = Visibility::from(user.visibility).toggled();
        self.set_visibility(id, next).await?;
        Ok(next)
    }

    /// Counts registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        users::Entity::find().count(&self.db).await
    }

    async fn passport_exists(&self, passport_series: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::PassportSeries.eq(passport_series))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

/// A user row with an already hashed password.
#[derive(Debug, Clone)]
pub(crate) struct UserRow {
    pub name: String,
    pub login: String,
    pub password_hash: String,
    pub passport_series: String,
    pub phone_number: String,
    pub visibility: Visibility,
}

/// Inserts a user row on any connection, including an open transaction.
pub(crate) async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    row: UserRow,
) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        name: Set(row.name),
        login: Set(row.login),
        password_hash: Set(row.password_hash),
        passport_series: Set(row.passport_series),
        phone_number: Set(row.phone_number),
        visibility: Set(row.visibility.into()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}
