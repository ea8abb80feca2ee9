//! Role-based authorization: pure functions, no store access.
//!
//! The session layer authenticates a request, then asks this module whether
//! the acting principal may perform an action (optionally against a
//! specific ticket) before invoking any store operation. Everything here is
//! a total function over `(role, action, resource)`; denials surface as
//! [`Error::PermissionDenied`], never as a domain error.
//!
//! Supervisor and admin are one equivalence class behind
//! [`Role::is_elevated`]; distinguishing them later means extending the
//! table here, not patching call sites.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};
use crate::model::ids::UserId;
use crate::model::ticket::Ticket;
use crate::model::user::{Role, User};

/// Everything a principal can ask to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    CreateTicket,
    ViewTicket,
    ReplyTicket,
    EditTicket,
    CloseTicket,
    AssignTicket,
    DeleteTicket,
    ManageUsers,
    ManageCategories,
}

impl Action {
    const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTicket => "create-ticket",
            Self::ViewTicket => "view-ticket",
            Self::ReplyTicket => "reply-ticket",
            Self::EditTicket => "edit-ticket",
            Self::CloseTicket => "close-ticket",
            Self::AssignTicket => "assign-ticket",
            Self::DeleteTicket => "delete-ticket",
            Self::ManageUsers => "manage-users",
            Self::ManageCategories => "manage-categories",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface for "is a valid session principal".
///
/// Implemented by [`User`]; the session layer may implement it on its own
/// session wrapper instead of threading full user records around.
pub trait Principal {
    fn id(&self) -> UserId;
    fn role(&self) -> Role;
    fn username(&self) -> &str;
}

impl Principal for User {
    fn id(&self) -> UserId {
        self.id
    }

    fn role(&self) -> Role {
        self.role
    }

    fn username(&self) -> &str {
        &self.username
    }
}

/// The coarse role/action table, before any per-resource ownership check.
#[must_use]
pub const fn role_allows(role: Role, action: Action) -> bool {
    match role {
        Role::Customer => matches!(
            action,
            Action::CreateTicket
                | Action::ViewTicket
                | Action::ReplyTicket
                | Action::EditTicket
                | Action::CloseTicket
        ),
        Role::Agent => matches!(
            action,
            Action::ViewTicket | Action::ReplyTicket | Action::EditTicket
        ),
        Role::Supervisor | Role::Admin => !matches!(action, Action::CreateTicket),
    }
}

/// Check the role table, without a resource in hand.
pub fn authorize<P: Principal + ?Sized>(principal: &P, action: Action) -> Result<()> {
    if role_allows(principal.role(), action) {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            role: principal.role(),
            action,
        })
    }
}

/// Check an action against a specific ticket, including ownership.
///
/// Customers may act only on tickets they created; agents only on tickets
/// in their visible set (assigned to them or unclaimed). Elevated roles
/// pass on the role table alone.
pub fn authorize_ticket<P: Principal + ?Sized>(
    principal: &P,
    action: Action,
    ticket: &Ticket,
) -> Result<()> {
    authorize(principal, action)?;
    if principal.role().is_elevated() || can_view(principal, ticket) {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            role: principal.role(),
            action,
        })
    }
}

/// The visibility filter.
///
/// - customer: only tickets they created;
/// - agent: tickets assigned to them plus the unassigned pool;
/// - supervisor/admin: everything, tombstones included.
#[must_use]
pub fn can_view<P: Principal + ?Sized>(principal: &P, ticket: &Ticket) -> bool {
    match principal.role() {
        Role::Customer => ticket.created_by == principal.id(),
        Role::Agent => ticket
            .assigned_to
            .as_ref()
            .is_none_or(|agent| agent.id == principal.id()),
        Role::Supervisor | Role::Admin => true,
    }
}

/// Guard for `delete_user`: requires the manage-users capability and rejects
/// self-deletion regardless of role.
pub fn authorize_user_delete<P: Principal + ?Sized>(principal: &P, target: UserId) -> Result<()> {
    authorize(principal, Action::ManageUsers)?;
    if principal.id() == target {
        return Err(Error::PermissionDenied {
            role: principal.role(),
            action: Action::ManageUsers,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Action, Principal, authorize, authorize_user_delete, can_view, role_allows};
    use crate::error::Error;
    use crate::model::ids::{TicketId, UserId};
    use crate::model::ticket::{AgentRef, Status, Ticket};
    use crate::model::user::Role;
    use chrono::Utc;

    struct Session {
        id: UserId,
        role: Role,
    }

    impl Principal for Session {
        fn id(&self) -> UserId {
            self.id
        }

        fn role(&self) -> Role {
            self.role
        }

        fn username(&self) -> &str {
            "session"
        }
    }

    fn ticket(created_by: u64, assigned_to: Option<u64>) -> Ticket {
        Ticket {
            id: TicketId(1),
            title: "vpn drops".into(),
            content: "every hour, on the hour".into(),
            status: Status::Open,
            created_by: UserId(created_by),
            assigned_to: assigned_to.map(|id| AgentRef {
                id: UserId(id),
                username: format!("agent{id}"),
            }),
            category: None,
            logs: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn customers_cannot_assign_or_manage() {
        assert!(role_allows(Role::Customer, Action::CreateTicket));
        assert!(!role_allows(Role::Customer, Action::AssignTicket));
        assert!(!role_allows(Role::Customer, Action::DeleteTicket));
        assert!(!role_allows(Role::Customer, Action::ManageUsers));
    }

    #[test]
    fn agents_work_tickets_but_nothing_else() {
        assert!(role_allows(Role::Agent, Action::ReplyTicket));
        assert!(role_allows(Role::Agent, Action::EditTicket));
        assert!(!role_allows(Role::Agent, Action::AssignTicket));
        assert!(!role_allows(Role::Agent, Action::CloseTicket));
        assert!(!role_allows(Role::Agent, Action::ManageCategories));
    }

    #[test]
    fn elevated_roles_manage_but_do_not_file() {
        for role in [Role::Supervisor, Role::Admin] {
            assert!(!role_allows(role, Action::CreateTicket));
            assert!(role_allows(role, Action::AssignTicket));
            assert!(role_allows(role, Action::ManageUsers));
        }
    }

    #[test]
    fn supervisor_and_admin_tables_are_identical() {
        let actions = [
            Action::CreateTicket,
            Action::ViewTicket,
            Action::ReplyTicket,
            Action::EditTicket,
            Action::CloseTicket,
            Action::AssignTicket,
            Action::DeleteTicket,
            Action::ManageUsers,
            Action::ManageCategories,
        ];
        for action in actions {
            assert_eq!(
                role_allows(Role::Supervisor, action),
                role_allows(Role::Admin, action),
                "tables diverge on {action}"
            );
        }
    }

    #[test]
    fn denial_carries_role_and_action() {
        let customer = Session {
            id: UserId(1),
            role: Role::Customer,
        };
        let err = authorize(&customer, Action::AssignTicket).expect_err("must deny");
        assert_eq!(
            err,
            Error::PermissionDenied {
                role: Role::Customer,
                action: Action::AssignTicket,
            }
        );
    }

    #[test]
    fn customer_sees_only_own_tickets() {
        let alice = Session {
            id: UserId(1),
            role: Role::Customer,
        };
        assert!(can_view(&alice, &ticket(1, None)));
        assert!(!can_view(&alice, &ticket(2, None)));
    }

    #[test]
    fn agent_sees_own_and_unassigned_only() {
        let bob = Session {
            id: UserId(5),
            role: Role::Agent,
        };
        assert!(can_view(&bob, &ticket(1, Some(5))));
        assert!(can_view(&bob, &ticket(1, None)), "unclaimed pool is visible");
        assert!(!can_view(&bob, &ticket(1, Some(6))));
    }

    #[test]
    fn elevated_roles_see_everything() {
        let boss = Session {
            id: UserId(9),
            role: Role::Supervisor,
        };
        assert!(can_view(&boss, &ticket(1, Some(5))));
    }

    #[test]
    fn self_deletion_is_rejected_even_for_admin() {
        let admin = Session {
            id: UserId(3),
            role: Role::Admin,
        };
        assert!(authorize_user_delete(&admin, UserId(4)).is_ok());
        assert!(matches!(
            authorize_user_delete(&admin, UserId(3)),
            Err(Error::PermissionDenied { .. })
        ));
    }
}
