//! The identity store: accounts, uniqueness, and credential checks.

use tracing::debug;

use crate::auth::PasswordHash;
use crate::clock::{Clock as _, SharedClock};
use crate::error::{Error, Result};
use crate::model::ids::{IdSeq, UserId};
use crate::model::user::{Role, User};

/// In-memory account store. One logical writer at a time: every mutation
/// takes `&mut self`.
#[derive(Debug)]
pub struct IdentityStore {
    users: Vec<User>,
    seq: IdSeq,
    clock: SharedClock,
}

/// Partial update for [`IdentityStore::update_user`]. `None` fields are
/// left untouched; in particular an omitted password keeps the stored hash.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl IdentityStore {
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            users: Vec::new(),
            seq: IdSeq::new(),
            clock,
        }
    }

    /// Register an account. The password is hashed before storage and the
    /// plaintext is dropped here.
    pub fn create_user(&mut self, username: &str, password: &str, role: Role) -> Result<&User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::Validation("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(Error::Validation("password must not be empty".into()));
        }
        if self.find_by_username(username).is_some() {
            return Err(Error::DuplicateUsername(username.to_string()));
        }

        let user = User {
            id: UserId(self.seq.next_id()),
            username: username.to_string(),
            role,
            password: PasswordHash::new(password),
            created_at: self.clock.now(),
        };
        debug!(id = %user.id, username = %user.username, role = %role, "user created");
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    /// Check a credential pair. The comparison against the stored hash is
    /// constant-time; the error never says which half was wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&User> {
        self.find_by_username(username)
            .filter(|user| user.verify_password(password))
            .ok_or(Error::InvalidCredentials)
    }

    /// Apply a partial update. Username collisions with a *different* user
    /// are rejected; renaming a user to its current name is fine.
    pub fn update_user(&mut self, id: UserId, update: UserUpdate) -> Result<&User> {
        if update.password.as_deref().is_some_and(str::is_empty) {
            return Err(Error::Validation("password must not be empty".into()));
        }
        if let Some(new_name) = update.username.as_deref() {
            let new_name = new_name.trim();
            if new_name.is_empty() {
                return Err(Error::Validation("username must not be empty".into()));
            }
            if self
                .find_by_username(new_name)
                .is_some_and(|other| other.id != id)
            {
                return Err(Error::DuplicateUsername(new_name.to_string()));
            }
        }

        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(Error::NotFound {
                entity: "user",
                id: id.0,
            })?;

        if let Some(new_name) = update.username {
            user.username = new_name.trim().to_string();
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(password) = update.password {
            user.password = PasswordHash::new(&password);
        }
        debug!(id = %id, username = %user.username, "user updated");
        Ok(user)
    }

    /// Remove an account. The self-deletion guard is the caller's policy
    /// check, not this store's concern.
    pub fn delete_user(&mut self, id: UserId) -> Result<()> {
        let index = self
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or(Error::NotFound {
                entity: "user",
                id: id.0,
            })?;
        let removed = self.users.remove(index);
        debug!(id = %id, username = %removed.username, "user deleted");
        Ok(())
    }

    pub fn list_users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// All users with the agent role, for assignment pickers and workload
    /// summaries.
    pub fn list_agents(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|user| user.role == Role::Agent)
    }

    #[must_use]
    pub fn find_by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    #[must_use]
    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username == username)
    }

    /// Drop every account and restart the id sequence. Test seam.
    pub fn reset(&mut self) {
        self.users.clear();
        self.seq = IdSeq::new();
    }
}
