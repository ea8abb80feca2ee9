//! The recoverable error surface shared by every store and the policy.
//!
//! Every precondition violation in the core maps to exactly one [`Error`]
//! kind; nothing here panics or aborts. The session layer catches each kind
//! and renders a user-facing message, optionally keyed by the stable
//! [`Error::code`] identifier.

use crate::model::user::Role;
use crate::policy::Action;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the core can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Empty or otherwise invalid input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Username uniqueness violation.
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Category name uniqueness violation.
    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    /// A referenced entity is absent (or tombstoned, for ticket writes).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Attempted to assign a ticket to a non-agent.
    #[error("cannot assign to '{username}': role is {role}, not agent")]
    InvalidAssignment { username: String, role: Role },

    /// The acting role lacks authorization for the action.
    #[error("role {role} is not permitted to {action}")]
    PermissionDenied { role: Role, action: Action },

    /// Authentication failure. Deliberately does not say which half failed.
    #[error("invalid username or password")]
    InvalidCredentials,
}

impl Error {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E1001",
            Self::DuplicateUsername(_) => "E1002",
            Self::DuplicateCategory(_) => "E1003",
            Self::NotFound { .. } => "E2001",
            Self::InvalidAssignment { .. } => "E2002",
            Self::PermissionDenied { .. } => "E3001",
            Self::InvalidCredentials => "E3002",
        }
    }
}
