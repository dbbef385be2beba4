//! Bounded per-observer entity lists.

use std::collections::HashSet;

use crate::types::EntityKey;

/// Entities an observer currently receives updates for, in the order they
/// were added.
#[derive(Debug, Clone)]
pub struct Viewport {
    order: Vec<EntityKey>,
    members: HashSet<EntityKey>,
    capacity: usize,
}

impl Viewport {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            order: Vec::new(),
            members: HashSet::new(),
            capacity,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.order.len() >= self.capacity
    }

    #[must_use]
    pub fn contains(&self, entity: EntityKey) -> bool {
        self.members.contains(&entity)
    }

    /// Adds `entity`. Returns `Ok(false)` if it was already present and
    /// `Err(())` if the viewport is full.
    pub(crate) fn insert(&mut self, entity: EntityKey) -> Result<bool, ()> {
        if self.members.contains(&entity) {
            return Ok(false);
        }
        if self.is_full() {
            return Err(());
        }
        self.members.insert(entity);
        self.order.push(entity);
        Ok(true)
    }

    /// Removes `entity`, keeping the order of the rest.
    pub(crate) fn remove(&mut self, entity: EntityKey) -> bool {
        if !self.members.remove(&entity) {
            return false;
        }
        self.order.retain(|tracked| *tracked != entity);
        true
    }

    /// Tracked entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.order.iter().copied()
    }
}
