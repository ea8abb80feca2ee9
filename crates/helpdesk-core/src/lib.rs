//! helpdesk-core: ticket lifecycle, role-based authorization, and audit
//! trail for a support helpdesk.
//!
//! The session/web layer is an external collaborator: it authenticates a
//! request against [`store::IdentityStore`], consults [`policy`] for the
//! requested action, invokes one store operation on [`store::Helpdesk`],
//! and renders the result. The [`dashboard`] module is the read side.
//!
//! # Conventions
//!
//! - **Errors**: every fallible operation returns [`error::Result`]; all
//!   kinds are recoverable and none panic.
//! - **Logging**: `tracing` macros at `debug!` on mutations, `info!` on
//!   cross-store coordination; subscribers are the binary's business.
//! - **Time**: stores never read the wall clock directly; they hold a
//!   [`clock::SharedClock`].

pub mod auth;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod policy;
pub mod store;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use dashboard::DashboardStats;
pub use error::{Error, Result};
pub use model::{
    AgentRef, Category, CategoryId, LogAction, LogEntry, Reply, Role, Status, Ticket, TicketId,
    User, UserId,
};
pub use policy::{Action, Principal};
pub use store::{CategoryRegistry, Helpdesk, IdentityStore, StatusChange, TicketStore, UserUpdate};
