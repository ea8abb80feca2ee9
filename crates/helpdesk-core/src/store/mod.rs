//! The stores and the facade that owns them.
//!
//! [`Helpdesk`] is the explicitly owned replacement for the reference
//! design's ambient global database: one value holding the identity store,
//! category registry, and ticket store, created at process start and handed
//! by reference into request handlers.
//!
//! Concurrency model: one logical writer. Every mutation takes `&mut self`,
//! so the borrow checker enforces serialization in-process; a session layer
//! serving concurrent requests wraps the single `Helpdesk` in a mutex and
//! resolves conflicts by arrival order. Nothing here is long-running or
//! I/O-bound, so no async machinery is involved.

pub mod categories;
pub mod identity;
pub mod tickets;

use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock as _, SharedClock, SystemClock};
use crate::dashboard::{self, DashboardStats};
use crate::error::Result;
use crate::model::ids::CategoryId;
use crate::model::user::Role;

pub use categories::CategoryRegistry;
pub use identity::{IdentityStore, UserUpdate};
pub use tickets::{StatusChange, TicketStore};

/// Default category names seeded for a fresh installation.
const DEMO_CATEGORIES: [&str; 12] = [
    "Portal",
    "Badge & Access",
    "Office Automation",
    "Printers & Scanners",
    "Hardware",
    "Software",
    "Network",
    "Internet & Email",
    "Telephony",
    "Accounting Software",
    "Workstation",
    "Purchase Request",
];

/// Owner of all in-memory state: the process-lifetime "database".
#[derive(Debug)]
pub struct Helpdesk {
    pub identity: IdentityStore,
    pub categories: CategoryRegistry,
    pub tickets: TicketStore,
    clock: SharedClock,
}

impl Helpdesk {
    /// Build an empty helpdesk over an injected clock.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            identity: IdentityStore::new(clock.clone()),
            categories: CategoryRegistry::new(clock.clone()),
            tickets: TicketStore::new(clock.clone()),
            clock,
        }
    }

    /// Build an empty helpdesk on the real wall clock.
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Delete a category and null out every ticket reference to it.
    ///
    /// The registry and the ticket store stay ignorant of each other; this
    /// is the one cross-store coordination point. Returns the number of
    /// tickets detached.
    pub fn delete_category(&mut self, id: CategoryId) -> Result<usize> {
        self.categories.delete(id)?;
        let detached = self.tickets.detach_category(id);
        if detached > 0 {
            info!(category = %id, detached, "detached deleted category from tickets");
        }
        Ok(detached)
    }

    /// Read-side workload and status summary as of now.
    #[must_use]
    pub fn dashboard(&self) -> DashboardStats {
        dashboard::compute_stats(&self.tickets, &self.identity, self.clock.now())
    }

    /// Drop all state and restart every id sequence. Test seam; also the
    /// documented way to re-seed a dev process.
    pub fn reset(&mut self) {
        self.identity.reset();
        self.categories.reset();
        self.tickets.reset();
    }

    /// Seed a fresh installation: one admin, one supervisor, two agents,
    /// one customer, the default categories, and a sample assigned ticket.
    /// A no-op when any user already exists.
    pub fn seed_demo(&mut self) -> Result<()> {
        if self.identity.list_users().next().is_some() {
            return Ok(());
        }

        self.identity.create_user("admin", "123", Role::Admin)?;
        let supervisor = self
            .identity
            .create_user("supervisor", "123", Role::Supervisor)?
            .clone();
        let agent = self.identity.create_user("agent1", "123", Role::Agent)?.clone();
        self.identity.create_user("agent2", "123", Role::Agent)?;
        let customer = self
            .identity
            .create_user("customer1", "123", Role::Customer)?
            .clone();

        for name in DEMO_CATEGORIES {
            self.categories.create(name)?;
        }
        let software = self.categories.find_by_name("Software").map(|category| category.id);

        let ticket = self
            .tickets
            .create(
                "Cannot sign in to the portal",
                "The login page rejects my password since this morning.",
                &customer,
                software,
            )?
            .id;
        self.tickets.assign(ticket, &agent, &supervisor)?;

        info!("seeded demo users, categories, and a sample ticket");
        Ok(())
    }
}
