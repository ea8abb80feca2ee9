//! Read-side workload and status summary.
//!
//! Pure computation over snapshots of the ticket and identity stores: no
//! mutation, no state of its own. Deleted tickets are invisible here even
//! though elevated roles can still browse the tombstones.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::ids::{TicketId, UserId};
use crate::model::ticket::{Status, Ticket};
use crate::store::identity::IdentityStore;
use crate::store::tickets::TicketStore;

/// How many recently touched tickets the summary carries.
pub const RECENT_LIMIT: usize = 5;

/// The aggregate handed to the dashboard view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// All tickets except tombstones.
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub in_progress_tickets: usize,
    pub answered_tickets: usize,
    pub closed_tickets: usize,
    /// Tickets created on the calendar day of the query.
    pub new_tickets_today: usize,
    /// Open workload per agent username, zero-filled for idle agents.
    pub agent_workload: BTreeMap<String, usize>,
    /// The [`RECENT_LIMIT`] most recently touched tickets, newest first.
    /// "Touched" is the newest audit entry, or creation for a bare ticket.
    pub recently_updated: Vec<TicketId>,
}

/// Compute the summary as of `now`.
#[must_use]
pub fn compute_stats(
    tickets: &TicketStore,
    identity: &IdentityStore,
    now: DateTime<Utc>,
) -> DashboardStats {
    let live: Vec<&Ticket> = tickets
        .iter()
        .filter(|ticket| !ticket.status.is_deleted())
        .collect();

    let count_of = |status: Status| live.iter().filter(|ticket| ticket.status == status).count();

    let today = now.date_naive();
    let new_tickets_today = live
        .iter()
        .filter(|ticket| ticket.created_at.date_naive() == today)
        .count();

    // Zero-fill from the agent roster so idle agents still show up, keyed
    // by current username rather than the assignment-time snapshot.
    let roster: BTreeMap<UserId, &str> = identity
        .list_agents()
        .map(|agent| (agent.id, agent.username.as_str()))
        .collect();
    let mut agent_workload: BTreeMap<String, usize> = roster
        .values()
        .map(|username| ((*username).to_string(), 0))
        .collect();
    for ticket in &live {
        if ticket.status == Status::Closed {
            continue;
        }
        if let Some(username) = ticket
            .assigned_to
            .as_ref()
            .and_then(|agent| roster.get(&agent.id))
        {
            if let Some(count) = agent_workload.get_mut(*username) {
                *count += 1;
            }
        }
    }

    let mut by_touch: Vec<&Ticket> = live.clone();
    by_touch.sort_by(|a, b| b.last_touched().cmp(&a.last_touched()));
    let recently_updated = by_touch
        .iter()
        .take(RECENT_LIMIT)
        .map(|ticket| ticket.id)
        .collect();

    DashboardStats {
        total_tickets: live.len(),
        open_tickets: count_of(Status::Open),
        in_progress_tickets: count_of(Status::InProgress),
        answered_tickets: count_of(Status::Answered),
        closed_tickets: count_of(Status::Closed),
        new_tickets_today,
        agent_workload,
        recently_updated,
    }
}
