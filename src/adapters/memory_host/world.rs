//! In-memory world and entity store.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::domain::ports::host::{EntityRef, EntityStore, World};

/// A single world holding bare entity ids.
#[derive(Debug)]
pub struct MemoryWorld {
    name: String,
    next_id: AtomicU64,
    entities: RwLock<BTreeSet<u64>>,
}

impl MemoryWorld {
    /// Empty world called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: AtomicU64::new(1),
            entities: RwLock::new(BTreeSet::new()),
        }
    }

    /// Create a new entity and return its handle.
    pub fn spawn_entity(&self) -> EntityRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        EntityRef(id)
    }

    /// Remove an entity; returns whether it existed.
    pub fn despawn(&self, entity: EntityRef) -> bool {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&entity.0)
    }
}

impl World for MemoryWorld {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EntityStore for MemoryWorld {
    fn world_name(&self) -> &str {
        &self.name
    }

    fn contains(&self, entity: EntityRef) -> bool {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&entity.0)
    }

    fn entity_count(&self) -> usize {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
