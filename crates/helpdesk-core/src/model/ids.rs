//! Typed entity identifiers and the per-store id sequence.
//!
//! Every store owns its own [`IdSeq`], so ids are unique within an entity
//! type but not across types. Ids are plain `u64` values assigned in
//! creation order and never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id! {
    /// Identifier of a [`User`](crate::model::user::User).
    UserId
}

entity_id! {
    /// Identifier of a [`Ticket`](crate::model::ticket::Ticket).
    TicketId
}

entity_id! {
    /// Identifier of a [`Category`](crate::model::category::Category).
    CategoryId
}

/// Monotonically increasing id sequence owned by a single store.
///
/// The first id handed out is 1; 0 is never a valid id.
#[derive(Debug, Default, Clone)]
pub struct IdSeq(u64);

impl IdSeq {
    /// Create a fresh sequence starting before 1.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}
