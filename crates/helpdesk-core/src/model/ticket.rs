//! Tickets, replies, and the append-only audit trail.
//!
//! A ticket moves through `open -> in_progress -> answered -> closed`, with
//! an absorbing `deleted` tombstone reachable from any state. Every mutation
//! of a ticket appends exactly one [`LogEntry`]; the log is never reordered
//! or pruned, and its newest entry drives "most recently touched" ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::model::ids::{CategoryId, TicketId, UserId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The five lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Answered,
    Closed,
    Deleted,
}

impl Status {
    /// All states in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::InProgress,
        Self::Answered,
        Self::Closed,
        Self::Deleted,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Answered => "answered",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        }
    }

    /// Whether this is the absorbing tombstone state.
    #[must_use]
    pub const fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid status '{}': expected one of open, in_progress, answered, closed, deleted",
            self.got
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "answered" => Ok(Self::Answered),
            "closed" => Ok(Self::Closed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseStatusError { got: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

/// The fixed vocabulary of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogAction {
    TicketCreated,
    TicketEdited,
    TicketDeleted,
    AgentAssigned,
    ReplyAdded,
    StatusChanged,
}

impl LogAction {
    /// Canonical kebab-case label used in rendered histories.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TicketCreated => "ticket-created",
            Self::TicketEdited => "ticket-edited",
            Self::TicketDeleted => "ticket-deleted",
            Self::AgentAssigned => "agent-assigned",
            Self::ReplyAdded => "reply-added",
            Self::StatusChanged => "status-changed",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record in a ticket's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    pub ticket_id: TicketId,
    /// The acting user at the time of the mutation.
    pub actor: UserId,
    pub action: LogAction,
    /// Free-text detail, e.g. `title changed from 'a' to 'b'`.
    pub details: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ticket and replies
// ---------------------------------------------------------------------------

/// Snapshot of the assigned agent at assignment time.
///
/// The username is denormalized so audit details and workload summaries can
/// name the agent without a join; it reflects the name at assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRef {
    pub id: UserId,
    pub username: String,
}

/// The central aggregate: a customer-filed support request.
#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub content: String,
    pub status: Status,
    /// Creating customer. Immutable after creation.
    pub created_by: UserId,
    /// Assigned agent, if any. Invariant: always a user whose role is agent.
    pub assigned_to: Option<AgentRef>,
    pub category: Option<CategoryId>,
    /// Append-only, creation-ordered audit trail.
    pub logs: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Timestamp of the last audit entry, or creation time for a ticket
    /// whose history is somehow empty.
    #[must_use]
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.logs.last().map_or(self.created_at, |log| log.created_at)
    }
}

/// An immutable message attached to exactly one ticket.
///
/// Replies are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub id: u64,
    pub ticket_id: TicketId,
    pub author: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{LogAction, LogEntry, Status, Ticket};
    use crate::model::ids::{TicketId, UserId};
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    #[test]
    fn status_json_roundtrips() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).expect("serialize"),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"answered\"").expect("deserialize"),
            Status::Answered
        );
    }

    #[test]
    fn display_parse_roundtrips() {
        for status in Status::ALL {
            let rendered = status.to_string();
            let reparsed = Status::from_str(&rendered).expect("reparse");
            assert_eq!(status, reparsed);
        }
    }

    #[test]
    fn parse_rejects_unknown_statuses() {
        assert!(Status::from_str("pending").is_err());
        assert!(Status::from_str("inprogress").is_err());
    }

    #[test]
    fn log_action_labels_are_kebab_case() {
        assert_eq!(LogAction::TicketCreated.as_str(), "ticket-created");
        assert_eq!(LogAction::AgentAssigned.as_str(), "agent-assigned");
        assert_eq!(
            serde_json::to_string(&LogAction::ReplyAdded).expect("serialize"),
            "\"reply-added\""
        );
    }

    #[test]
    fn last_touched_prefers_newest_log() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("ts");
        let later = Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).single().expect("ts");

        let mut ticket = Ticket {
            id: TicketId(1),
            title: "printer jam".into(),
            content: "tray two again".into(),
            status: Status::Open,
            created_by: UserId(1),
            assigned_to: None,
            category: None,
            logs: Vec::new(),
            created_at: created,
        };
        assert_eq!(ticket.last_touched(), created);

        ticket.logs.push(LogEntry {
            id: 1,
            ticket_id: ticket.id,
            actor: UserId(1),
            action: LogAction::TicketCreated,
            details: String::new(),
            created_at: later,
        });
        assert_eq!(ticket.last_touched(), later);
    }
}
