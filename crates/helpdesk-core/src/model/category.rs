//! Ticket categorization tags.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ids::CategoryId;

/// A named tag referenced by zero or more tickets.
///
/// Names are unique within the registry; listing order is creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
