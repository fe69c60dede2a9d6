//! Identity cache for rehydrated and saved departments.
//!
//! # Responsibility
//! - Map a row id to the department state currently considered
//!   authoritative for that id.
//!
//! # Invariants
//! - At most one entry per id; inserting for an existing id overwrites it
//!   without reconciling fields.
//! - Entries are owned snapshots. Mutating a `Department` after it was cached
//!   does not change the cache until the repository stores it again.
//! - No synchronization: one cache belongs to one repository on one thread.

use crate::model::department::{Department, DepartmentId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct IdentityCache {
    entries: HashMap<DepartmentId, Department>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached entity for `id`.
    pub fn get(&self, id: DepartmentId) -> Option<Department> {
        self.entries.get(&id).cloned()
    }

    pub fn contains(&self, id: DepartmentId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Stores `department` under `id`, returning the entry it replaced.
    pub fn insert(&mut self, id: DepartmentId, department: Department) -> Option<Department> {
        self.entries.insert(id, department)
    }

    pub fn remove(&mut self, id: DepartmentId) -> Option<Department> {
        self.entries.remove(&id)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached ids in ascending order.
    pub fn ids(&self) -> Vec<DepartmentId> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
