//! In-memory recipe collection for the current user.
//!
//! The cache is a rebuildable copy of what the server reports; it is only
//! ever replaced wholesale. Each fetch is tagged with a [`LoadTicket`] so a
//! slow response cannot overwrite data applied from a newer one.

use crate::filter::RecipeFilter;
use crate::types::{Recipe, RecipeId, UserId};

/// Issued when a load starts and handed back with its result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    seq: u64,
    user_id: UserId,
}

#[derive(Debug, Default)]
pub struct RecipeCache {
    recipes: Vec<Recipe>,
    owner: Option<UserId>,
    issued: u64,
    /// Highest sequence whose result was applied, or that was superseded by
    /// a reset.
    applied: u64,
}

impl RecipeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// User the current collection belongs to, once a load has been applied.
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn begin_load(&mut self, user_id: &UserId) -> LoadTicket {
        self.issued += 1;
        LoadTicket {
            seq: self.issued,
            user_id: user_id.clone(),
        }
    }

    /// Replace the collection with a completed load's result. Returns `false`
    /// and leaves the cache untouched when the ticket is stale.
    pub fn apply_load(&mut self, ticket: LoadTicket, recipes: Vec<Recipe>) -> bool {
        if ticket.seq <= self.applied {
            tracing::warn!(
                seq = ticket.seq,
                applied = self.applied,
                "discarding stale recipe load"
            );
            return false;
        }

        tracing::debug!(seq = ticket.seq, count = recipes.len(), user_id = %ticket.user_id, "recipe collection replaced");
        self.applied = ticket.seq;
        self.owner = Some(ticket.user_id);
        self.recipes = recipes;
        true
    }

    /// Drop the collection and invalidate every outstanding ticket.
    pub fn clear(&mut self) {
        self.recipes.clear();
        self.owner = None;
        self.applied = self.issued;
    }

    /// Pure view over the last applied collection.
    pub fn filter(&self, filter: &RecipeFilter) -> Vec<Recipe> {
        filter.apply(&self.recipes)
    }
}
