//! Domain entities: users, categories, tickets, replies, and audit records.
//!
//! Entities are plain data. Lifecycle rules and uniqueness checks live in
//! the stores under [`crate::store`]; authorization lives in
//! [`crate::policy`]. Every entity embeds its own `id` and `created_at` by
//! composition, assigned once by the owning store.

pub mod category;
pub mod ids;
pub mod ticket;
pub mod user;

pub use category::Category;
pub use ids::{CategoryId, IdSeq, TicketId, UserId};
pub use ticket::{AgentRef, LogAction, LogEntry, Reply, Status, Ticket};
pub use user::{Role, User};
