//! Authenticated sessions.

use chrono::{DateTime, Utc};
use ibank_shared::types::{ManagerId, UserId};
use serde::{Deserialize, Serialize};

/// Who is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Principal {
    /// A bank customer.
    Customer(UserId),
    /// A branch manager.
    Manager(ManagerId),
}

/// An authenticated session, passed explicitly to whatever acts on behalf of
/// the logged-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated principal.
    pub principal: Principal,
    /// Login used to authenticate.
    pub login: String,
    /// When authentication succeeded.
    pub opened_at: DateTime<Utc>,
}

impl Session {
    /// Opens a customer session.
    #[must_use]
    pub fn customer(user: UserId, login: impl Into<String>) -> Self {
        Self {
            principal: Principal::Customer(user),
            login: login.into(),
            opened_at: Utc::now(),
        }
    }

    /// Opens a manager session.
    #[must_use]
    pub fn manager(manager: ManagerId, login: impl Into<String>) -> Self {
        Self {
            principal: Principal::Manager(manager),
            login: login.into(),
            opened_at: Utc::now(),
        }
    }

    /// Returns the customer id, if this is a customer session.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self.principal {
            Principal::Customer(id) => Some(id),
            Principal::Manager(_) => None,
        }
    }

    /// Returns true for manager sessions.
    #[must_use]
    pub const fn is_manager(&self) -> bool {
        matches!(self.principal, Principal::Manager(_))
    }
}
