//! The category registry: unique names, creation-ordered listing.
//!
//! Deleting a category leaves ticket references to repair; the
//! [`Helpdesk`](crate::store::Helpdesk) facade coordinates the detach so
//! this store stays ignorant of tickets.

use tracing::debug;

use crate::clock::{Clock as _, SharedClock};
use crate::error::{Error, Result};
use crate::model::category::Category;
use crate::model::ids::{CategoryId, IdSeq};

/// In-memory category registry.
#[derive(Debug)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    seq: IdSeq,
    clock: SharedClock,
}

impl CategoryRegistry {
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            categories: Vec::new(),
            seq: IdSeq::new(),
            clock,
        }
    }

    pub fn create(&mut self, name: &str) -> Result<&Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("category name must not be empty".into()));
        }
        if self.find_by_name(name).is_some() {
            return Err(Error::DuplicateCategory(name.to_string()));
        }

        let category = Category {
            id: CategoryId(self.seq.next_id()),
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        debug!(id = %category.id, name = %category.name, "category created");
        self.categories.push(category);
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Rename a category; uniqueness is re-checked against other entries.
    pub fn rename(&mut self, id: CategoryId, new_name: &str) -> Result<&Category> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::Validation("category name must not be empty".into()));
        }
        if self
            .find_by_name(new_name)
            .is_some_and(|other| other.id != id)
        {
            return Err(Error::DuplicateCategory(new_name.to_string()));
        }

        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(Error::NotFound {
                entity: "category",
                id: id.0,
            })?;
        debug!(id = %id, from = %category.name, to = %new_name, "category renamed");
        category.name = new_name.to_string();
        Ok(category)
    }

    /// Remove a category. Callers owning tickets must detach references;
    /// see `Helpdesk::delete_category`.
    pub fn delete(&mut self, id: CategoryId) -> Result<()> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or(Error::NotFound {
                entity: "category",
                id: id.0,
            })?;
        let removed = self.categories.remove(index);
        debug!(id = %id, name = %removed.name, "category deleted");
        Ok(())
    }

    /// All categories in creation order.
    pub fn list(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    #[must_use]
    pub fn find_by_id(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Drop every category and restart the id sequence. Test seam.
    pub fn reset(&mut self) {
        self.categories.clear();
        self.seq = IdSeq::new();
    }
}
