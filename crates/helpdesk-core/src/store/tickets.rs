//! The ticket store: lifecycle state machine, replies, and audit trail.
//!
//! Lifecycle: `open -> in_progress -> answered -> closed`, with `deleted`
//! as an absorbing tombstone reachable from any state. Every successful
//! mutation appends exactly one [`LogEntry`]; a same-status `set_status`
//! call is a signaled no-op that appends nothing.
//!
//! Tombstones act as absent for writes: once a ticket is soft-deleted, every
//! other mutation fails `NotFound`, which is what makes `deleted` absorbing.
//!
//! Reopen rule: a customer reply to an `answered` ticket moves it back to
//! `open`. Earlier in-house variants of this tracker disagreed on the rule;
//! this store commits to the reopen-on-follow-up behavior.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::{Clock as _, SharedClock};
use crate::error::{Error, Result};
use crate::model::ids::{CategoryId, IdSeq, TicketId};
use crate::model::ticket::{AgentRef, LogAction, LogEntry, Reply, Status, Ticket};
use crate::model::user::{Role, User};
use crate::policy::{self, Action, Principal};

/// Longest reply excerpt recorded in a `reply-added` audit detail.
const REPLY_PREVIEW_CHARS: usize = 30;

/// Outcome of [`TicketStore::set_status`], so callers can tell a real
/// transition from a "no change" short-circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Changed { from: Status, to: Status },
    NoOp,
}

/// In-memory ticket store. One logical writer at a time: every mutation
/// takes `&mut self`.
#[derive(Debug)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
    replies: Vec<Reply>,
    ticket_seq: IdSeq,
    reply_seq: IdSeq,
    log_seq: IdSeq,
    clock: SharedClock,
}

impl TicketStore {
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            tickets: Vec::new(),
            replies: Vec::new(),
            ticket_seq: IdSeq::new(),
            reply_seq: IdSeq::new(),
            log_seq: IdSeq::new(),
            clock,
        }
    }

    /// File a new ticket in `open` with a `ticket-created` audit entry.
    pub fn create(
        &mut self,
        title: &str,
        content: &str,
        creator: &User,
        category: Option<CategoryId>,
    ) -> Result<&Ticket> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("ticket title must not be empty".into()));
        }
        if content.trim().is_empty() {
            return Err(Error::Validation("ticket content must not be empty".into()));
        }

        let now = self.clock.now();
        let mut ticket = Ticket {
            id: TicketId(self.ticket_seq.next_id()),
            title: title.to_string(),
            content: content.to_string(),
            status: Status::Open,
            created_by: creator.id,
            assigned_to: None,
            category,
            logs: Vec::new(),
            created_at: now,
        };
        push_log(
            &mut self.log_seq,
            &mut ticket,
            creator,
            LogAction::TicketCreated,
            String::new(),
            now,
        );
        debug!(id = %ticket.id, title = %ticket.title, by = %creator.username, "ticket created");
        self.tickets.push(ticket);
        Ok(&self.tickets[self.tickets.len() - 1])
    }

    /// Assign (or re-assign) a ticket to an agent.
    ///
    /// Fails `InvalidAssignment` unless the assignee's role is agent.
    /// Always lands in `in_progress`, even from `answered` or `closed`:
    /// handing a ticket to an agent re-opens the work.
    pub fn assign(&mut self, id: TicketId, agent: &User, actor: &User) -> Result<()> {
        if agent.role != Role::Agent {
            return Err(Error::InvalidAssignment {
                username: agent.username.clone(),
                role: agent.role,
            });
        }

        let now = self.clock.now();
        let index = self.live_index(id)?;
        let ticket = &mut self.tickets[index];

        let previous = ticket
            .assigned_to
            .replace(AgentRef {
                id: agent.id,
                username: agent.username.clone(),
            })
            .map_or_else(|| "nobody".to_string(), |prev| format!("'{}'", prev.username));
        ticket.status = Status::InProgress;

        let details = format!("from {previous} to '{}'", agent.username);
        push_log(
            &mut self.log_seq,
            ticket,
            actor,
            LogAction::AgentAssigned,
            details,
            now,
        );
        debug!(id = %id, agent = %agent.username, by = %actor.username, "ticket assigned");
        Ok(())
    }

    /// Append a reply and apply the status dance:
    /// a staff reply answers an `open` ticket; a customer follow-up reopens
    /// an `answered` one.
    pub fn reply(&mut self, id: TicketId, author: &User, content: &str) -> Result<&Reply> {
        if content.trim().is_empty() {
            return Err(Error::Validation("reply content must not be empty".into()));
        }

        let now = self.clock.now();
        let index = self.live_index(id)?;
        let ticket = &mut self.tickets[index];

        match (author.role, ticket.status) {
            (Role::Customer, Status::Answered) => ticket.status = Status::Open,
            (Role::Agent | Role::Supervisor | Role::Admin, Status::Open) => {
                ticket.status = Status::Answered;
            }
            _ => {}
        }

        push_log(
            &mut self.log_seq,
            ticket,
            author,
            LogAction::ReplyAdded,
            preview(content),
            now,
        );

        let reply = Reply {
            id: self.reply_seq.next_id(),
            ticket_id: id,
            author: author.id,
            content: content.to_string(),
            created_at: now,
        };
        debug!(id = %id, by = %author.username, "reply added");
        self.replies.push(reply);
        Ok(&self.replies[self.replies.len() - 1])
    }

    /// Edit title and content in place. Status is untouched; the audit
    /// entry records the title delta.
    pub fn edit(
        &mut self,
        id: TicketId,
        new_title: &str,
        new_content: &str,
        actor: &User,
    ) -> Result<()> {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Err(Error::Validation("ticket title must not be empty".into()));
        }
        if new_content.trim().is_empty() {
            return Err(Error::Validation("ticket content must not be empty".into()));
        }

        let now = self.clock.now();
        let index = self.live_index(id)?;
        let ticket = &mut self.tickets[index];

        let details = format!("title changed from '{}' to '{new_title}'", ticket.title);
        ticket.title = new_title.to_string();
        ticket.content = new_content.to_string();
        push_log(
            &mut self.log_seq,
            ticket,
            actor,
            LogAction::TicketEdited,
            details,
            now,
        );
        debug!(id = %id, by = %actor.username, "ticket edited");
        Ok(())
    }

    /// Direct status override, used for explicit close.
    ///
    /// Setting the current status again returns [`StatusChange::NoOp`] and
    /// appends nothing. `deleted` is unreachable here; use
    /// [`Self::soft_delete`].
    pub fn set_status(&mut self, id: TicketId, actor: &User, new_status: Status) -> Result<StatusChange> {
        if new_status.is_deleted() {
            return Err(Error::Validation(
                "status 'deleted' is set via soft delete, not a status change".into(),
            ));
        }

        let now = self.clock.now();
        let index = self.live_index(id)?;
        let ticket = &mut self.tickets[index];

        let from = ticket.status;
        if from == new_status {
            return Ok(StatusChange::NoOp);
        }

        ticket.status = new_status;
        push_log(
            &mut self.log_seq,
            ticket,
            actor,
            LogAction::StatusChanged,
            format!("from {from} to {new_status}"),
            now,
        );
        debug!(id = %id, %from, to = %new_status, by = %actor.username, "status changed");
        Ok(StatusChange::Changed {
            from,
            to: new_status,
        })
    }

    /// Tombstone a ticket. Supervisor/admin only; irreversible: there is
    /// no restore. Deleting an already-deleted ticket is an absorbing no-op
    /// with no duplicate audit entry.
    pub fn soft_delete(&mut self, id: TicketId, actor: &User) -> Result<()> {
        if !actor.role.is_elevated() {
            return Err(Error::PermissionDenied {
                role: actor.role,
                action: Action::DeleteTicket,
            });
        }

        let now = self.clock.now();
        let ticket = self
            .tickets
            .iter_mut()
            .find(|ticket| ticket.id == id)
            .ok_or(Error::NotFound {
                entity: "ticket",
                id: id.0,
            })?;
        if ticket.status.is_deleted() {
            return Ok(());
        }

        ticket.status = Status::Deleted;
        push_log(
            &mut self.log_seq,
            ticket,
            actor,
            LogAction::TicketDeleted,
            String::new(),
            now,
        );
        debug!(id = %id, by = %actor.username, "ticket soft-deleted");
        Ok(())
    }

    #[must_use]
    pub fn by_id(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| ticket.id == id)
    }

    /// Replies for one ticket, in creation order.
    pub fn replies_for(&self, id: TicketId) -> impl Iterator<Item = &Reply> {
        self.replies.iter().filter(move |reply| reply.ticket_id == id)
    }

    /// The tickets a principal is authorized to see, per the policy filter.
    pub fn visible_to<'a, P: Principal + ?Sized>(
        &'a self,
        principal: &'a P,
    ) -> impl Iterator<Item = &'a Ticket> {
        self.tickets
            .iter()
            .filter(move |ticket| policy::can_view(principal, ticket))
    }

    /// Every ticket, tombstones included. Read-side consumers filter.
    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter()
    }

    /// Null out references to a deleted category. Coordination hook for the
    /// facade; not an audited ticket mutation (nothing the user said or did
    /// to the ticket changed).
    pub(crate) fn detach_category(&mut self, category: CategoryId) -> usize {
        let mut detached = 0;
        for ticket in &mut self.tickets {
            if ticket.category == Some(category) {
                ticket.category = None;
                detached += 1;
            }
        }
        detached
    }

    /// Drop everything and restart the id sequences. Test seam.
    pub fn reset(&mut self) {
        self.tickets.clear();
        self.replies.clear();
        self.ticket_seq = IdSeq::new();
        self.reply_seq = IdSeq::new();
        self.log_seq = IdSeq::new();
    }

    /// Index of a ticket that exists and is not tombstoned.
    fn live_index(&self, id: TicketId) -> Result<usize> {
        self.tickets
            .iter()
            .position(|ticket| ticket.id == id && !ticket.status.is_deleted())
            .ok_or(Error::NotFound {
                entity: "ticket",
                id: id.0,
            })
    }
}

fn push_log(
    seq: &mut IdSeq,
    ticket: &mut Ticket,
    actor: &User,
    action: LogAction,
    details: String,
    at: DateTime<Utc>,
) {
    ticket.logs.push(LogEntry {
        id: seq.next_id(),
        ticket_id: ticket.id,
        actor: actor.id,
        action,
        details,
        created_at: at,
    });
}

/// Short excerpt of a reply for the audit detail, quoted like the rendered
/// history expects. Multi-byte safe: truncation counts chars, not bytes.
fn preview(content: &str) -> String {
    let mut excerpt: String = content.chars().take(REPLY_PREVIEW_CHARS).collect();
    if content.chars().nth(REPLY_PREVIEW_CHARS).is_some() {
        excerpt.push_str("...");
    }
    format!("\"{excerpt}\"")
}

#[cfg(test)]
mod tests {
    use super::{StatusChange, TicketStore, preview};
    use crate::clock::{ManualClock, SharedClock};
    use crate::error::Error;
    use crate::model::ids::TicketId;
    use crate::model::ticket::{LogAction, Status};
    use crate::model::user::{Role, User};
    use crate::store::identity::IdentityStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    struct Fixture {
        tickets: TicketStore,
        identity: IdentityStore,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("ts");
        let clock = Arc::new(ManualClock::starting_at(start));
        let shared: SharedClock = clock.clone();
        let mut identity = IdentityStore::new(shared.clone());
        for (name, role) in [
            ("alice", Role::Customer),
            ("bob", Role::Agent),
            ("carol", Role::Agent),
            ("dan", Role::Admin),
        ] {
            identity.create_user(name, "pw", role).expect("seed user");
        }
        Fixture {
            tickets: TicketStore::new(shared),
            identity,
            clock,
        }
    }

    fn user(fixture: &Fixture, name: &str) -> User {
        fixture
            .identity
            .find_by_username(name)
            .expect("seeded user")
            .clone()
    }

    #[test]
    fn create_starts_open_with_one_created_log() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let id = fx
            .tickets
            .create("Cannot log in", "details", &alice, None)
            .expect("create")
            .id;

        let ticket = fx.tickets.by_id(id).expect("exists");
        assert_eq!(ticket.status, Status::Open);
        assert_eq!(ticket.logs.len(), 1);
        assert_eq!(ticket.logs[0].action, LogAction::TicketCreated);
        assert_eq!(ticket.created_by, alice.id);
    }

    #[test]
    fn create_rejects_blank_title_or_content() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        assert!(matches!(
            fx.tickets.create("  ", "details", &alice, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            fx.tickets.create("title", "\n", &alice, None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn assign_requires_agent_role() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        let err = fx.tickets.assign(id, &alice, &dan).expect_err("customer assignee");
        assert_eq!(
            err,
            Error::InvalidAssignment {
                username: "alice".into(),
                role: Role::Customer,
            }
        );
    }

    #[test]
    fn assign_always_lands_in_progress_and_logs_the_handoff() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let bob = user(&fx, "bob");
        let carol = user(&fx, "carol");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        fx.tickets.assign(id, &bob, &dan).expect("first assign");
        fx.tickets
            .set_status(id, &dan, Status::Closed)
            .expect("close");

        // Re-assignment re-opens work-in-progress, even from closed.
        fx.tickets.assign(id, &carol, &dan).expect("re-assign");
        let ticket = fx.tickets.by_id(id).expect("exists");
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(
            ticket.assigned_to.as_ref().map(|agent| agent.username.as_str()),
            Some("carol")
        );

        let assigns: Vec<&str> = ticket
            .logs
            .iter()
            .filter(|log| log.action == LogAction::AgentAssigned)
            .map(|log| log.details.as_str())
            .collect();
        assert_eq!(assigns, ["from nobody to 'bob'", "from 'bob' to 'carol'"]);
    }

    #[test]
    fn staff_reply_answers_and_customer_reply_reopens() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let bob = user(&fx, "bob");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        fx.tickets.reply(id, &bob, "try rebooting").expect("staff reply");
        assert_eq!(fx.tickets.by_id(id).expect("exists").status, Status::Answered);

        fx.tickets.reply(id, &alice, "still broken").expect("follow-up");
        assert_eq!(fx.tickets.by_id(id).expect("exists").status, Status::Open);
    }

    #[test]
    fn customer_reply_on_open_keeps_it_open() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        fx.tickets.reply(id, &alice, "more detail").expect("reply");
        assert_eq!(fx.tickets.by_id(id).expect("exists").status, Status::Open);
    }

    #[test]
    fn staff_reply_does_not_touch_in_progress() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let bob = user(&fx, "bob");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;
        fx.tickets.assign(id, &bob, &dan).expect("assign");

        fx.tickets.reply(id, &bob, "on it").expect("reply");
        assert_eq!(fx.tickets.by_id(id).expect("exists").status, Status::InProgress);
    }

    #[test]
    fn reply_log_truncates_long_content() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        let long = "x".repeat(80);
        fx.tickets.reply(id, &alice, &long).expect("reply");
        let ticket = fx.tickets.by_id(id).expect("exists");
        let log = ticket.logs.last().expect("reply log");
        assert_eq!(log.action, LogAction::ReplyAdded);
        assert_eq!(log.details, format!("\"{}...\"", "x".repeat(30)));
    }

    #[test]
    fn preview_is_char_safe_and_quotes_short_content() {
        assert_eq!(preview("hi"), "\"hi\"");
        // 31 multi-byte chars truncate at 30 without slicing a codepoint.
        let snowmen = "\u{2603}".repeat(31);
        assert_eq!(preview(&snowmen), format!("\"{}...\"", "\u{2603}".repeat(30)));
    }

    #[test]
    fn edit_records_title_delta_and_keeps_status() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let bob = user(&fx, "bob");
        let id = fx
            .tickets
            .create("typo in tittle", "c", &alice, None)
            .expect("create")
            .id;
        fx.tickets.reply(id, &bob, "answered").expect("reply");

        fx.tickets
            .edit(id, "typo in title", "better content", &alice)
            .expect("edit");

        let ticket = fx.tickets.by_id(id).expect("exists");
        assert_eq!(ticket.status, Status::Answered, "edit never changes status");
        assert_eq!(ticket.title, "typo in title");
        assert_eq!(ticket.content, "better content");
        let log = ticket.logs.last().expect("edit log");
        assert_eq!(log.action, LogAction::TicketEdited);
        assert_eq!(
            log.details,
            "title changed from 'typo in tittle' to 'typo in title'"
        );
    }

    #[test]
    fn set_status_same_value_is_a_signaled_noop() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        let before = fx.tickets.by_id(id).expect("exists").clone();
        let outcome = fx
            .tickets
            .set_status(id, &dan, Status::Open)
            .expect("same status");
        assert_eq!(outcome, StatusChange::NoOp);

        let after = fx.tickets.by_id(id).expect("exists");
        assert_eq!(after.status, before.status);
        assert_eq!(after.logs.len(), before.logs.len(), "no-op appends nothing");
    }

    #[test]
    fn set_status_transition_logs_from_and_to() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        let outcome = fx
            .tickets
            .set_status(id, &dan, Status::Closed)
            .expect("close");
        assert_eq!(
            outcome,
            StatusChange::Changed {
                from: Status::Open,
                to: Status::Closed,
            }
        );
        let log = fx.tickets.by_id(id).expect("exists").logs.last().expect("log").clone();
        assert_eq!(log.action, LogAction::StatusChanged);
        assert_eq!(log.details, "from open to closed");
    }

    #[test]
    fn set_status_cannot_reach_deleted() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;
        assert!(matches!(
            fx.tickets.set_status(id, &dan, Status::Deleted),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn soft_delete_requires_elevated_actor_and_absorbs() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let bob = user(&fx, "bob");
        let dan = user(&fx, "dan");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        assert!(matches!(
            fx.tickets.soft_delete(id, &bob),
            Err(Error::PermissionDenied { .. })
        ));

        fx.tickets.soft_delete(id, &dan).expect("delete");
        let ticket = fx.tickets.by_id(id).expect("tombstone is retained");
        assert_eq!(ticket.status, Status::Deleted);
        let log_count = ticket.logs.len();

        // Absorbing: no mutation moves a tombstone, and repeat deletion
        // appends no duplicate audit entry.
        fx.tickets.soft_delete(id, &dan).expect("idempotent");
        assert_eq!(fx.tickets.by_id(id).expect("exists").logs.len(), log_count);
        assert!(matches!(
            fx.tickets.assign(id, &bob, &dan),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            fx.tickets.reply(id, &alice, "hello?"),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            fx.tickets.set_status(id, &dan, Status::Closed),
            Err(Error::NotFound { .. })
        ));
        assert_eq!(fx.tickets.by_id(id).expect("exists").status, Status::Deleted);
    }

    #[test]
    fn replies_are_ordered_by_creation() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let bob = user(&fx, "bob");
        let id = fx
            .tickets
            .create("t", "c", &alice, None)
            .expect("create")
            .id;

        fx.tickets.reply(id, &bob, "first").expect("reply");
        fx.clock.advance_millis(1_000);
        fx.tickets.reply(id, &alice, "second").expect("reply");
        fx.clock.advance_millis(1_000);
        fx.tickets.reply(id, &bob, "third").expect("reply");

        let contents: Vec<&str> = fx
            .tickets
            .replies_for(id)
            .map(|reply| reply.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn operations_on_missing_tickets_are_not_found() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let missing = TicketId(404);
        assert!(matches!(
            fx.tickets.reply(missing, &alice, "anyone?"),
            Err(Error::NotFound {
                entity: "ticket",
                id: 404
            })
        ));
        assert!(matches!(
            fx.tickets.edit(missing, "t", "c", &alice),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn detach_category_nulls_matching_references() {
        let mut fx = fixture();
        let alice = user(&fx, "alice");
        let category = crate::model::ids::CategoryId(3);
        let with = fx
            .tickets
            .create("a", "c", &alice, Some(category))
            .expect("create")
            .id;
        let without = fx
            .tickets
            .create("b", "c", &alice, None)
            .expect("create")
            .id;

        assert_eq!(fx.tickets.detach_category(category), 1);
        assert_eq!(fx.tickets.by_id(with).expect("exists").category, None);
        assert_eq!(fx.tickets.by_id(without).expect("exists").category, None);
    }
}
