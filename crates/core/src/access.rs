//! Access gate: per-user visibility consulted before authentication.

use serde::{Deserialize, Serialize};

/// Whether a customer may log in.
///
/// Managers hide a customer to suspend access without deleting anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// The customer may log in.
    #[default]
    Visible,
    /// The customer is suspended.
    Hidden,
}

impl Visibility {
    /// Returns true if authentication must be refused.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Returns the opposite state, used by the manager's toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Visible => Self::Hidden,
            Self::Hidden => Self::Visible,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_visible() {
        assert_eq!(Visibility::default(), Visibility::Visible);
        assert!(!Visibility::Visible.is_hidden());
        assert!(Visibility::Hidden.is_hidden());
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Visibility::Visible.toggled(), Visibility::Hidden);
        assert_eq!(Visibility::Hidden.toggled().toggled(), Visibility::Hidden);
    }
}
