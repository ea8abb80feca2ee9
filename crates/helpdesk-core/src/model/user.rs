//! User accounts and the role vocabulary.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};

use crate::auth::PasswordHash;
use crate::model::ids::UserId;

/// The four account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
    Supervisor,
    Admin,
}

impl Role {
    /// All roles in privilege order.
    pub const ALL: [Self; 4] = [Self::Customer, Self::Agent, Self::Supervisor, Self::Admin];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }

    /// Whether this role carries management privileges.
    ///
    /// Supervisor and admin are one equivalence class everywhere in the
    /// authorization rules; a future split must extend the policy module
    /// rather than patch call sites.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Supervisor | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    pub got: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid role '{}': expected one of customer, agent, supervisor, admin",
            self.got
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "agent" => Ok(Self::Agent),
            "supervisor" => Ok(Self::Supervisor),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError { got: s.to_string() }),
        }
    }
}

/// A registered account.
///
/// The password is held only as a salted one-way hash and is never
/// serialized. Ids and creation timestamps are assigned once by the
/// identity store and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub(crate) password: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verify a candidate password against the stored hash.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }
}
