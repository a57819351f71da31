//! Change tracking for entities loaded inside a unit of work
//!
//! A [`Tracked`] value remembers whether its entity is new, unchanged since
//! it was loaded, or modified. Saving through a
//! [`UnitOfWork`](crate::ports::UnitOfWork) inserts new entities, updates
//! dirty ones and skips the rest.

use std::ops::Deref;

/// Persistence state of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Not yet stored
    New,
    /// Matches the stored row
    Loaded,
    /// Modified since it was loaded
    Dirty,
}

/// An entity together with its persistence state
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    entity: T,
    state: EntityState,
}

impl<T> Tracked<T> {
    /// Wraps an entity that has not been stored yet
    pub fn new(entity: T) -> Self {
        Self {
            entity,
            state: EntityState::New,
        }
    }

    /// Wraps an entity read from storage
    pub fn loaded(entity: T) -> Self {
        Self {
            entity,
            state: EntityState::Loaded,
        }
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Returns true when a save would write something
    pub fn needs_save(&self) -> bool {
        self.state != EntityState::Loaded
    }

    /// Applies a change that always modifies the entity
    pub fn edit<R>(&mut self, change: impl FnOnce(&mut T) -> R) -> R {
        let result = change(&mut self.entity);
        self.touch();
        result
    }

    /// Applies a change that reports whether it modified anything
    pub fn update(&mut self, change: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = change(&mut self.entity);
        if changed {
            self.touch();
        }
        changed
    }

    /// Records a successful save
    pub fn mark_saved(&mut self) {
        self.state = EntityState::Loaded;
    }

    pub fn into_inner(self) -> T {
        self.entity
    }

    fn touch(&mut self) {
        if self.state == EntityState::Loaded {
            self.state = EntityState::Dirty;
        }
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}
