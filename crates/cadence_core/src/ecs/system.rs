//! System trait and tracked-entity maps
//!
//! A system is given the chance to update once per fixed step, interpolate
//! once per frame with the leftover step fraction, and render. Systems track
//! the entities they care about explicitly through an [`EntityMap`]; there is
//! no automatic subscription.

use super::entity::{Entity, EntityId};
use crate::graphics::Renderer;
use crate::runtime::GameContext;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A unit of simulation behavior scheduled by the frame loop
pub trait System: Send {
    /// Advance simulation state by one fixed step
    fn update(&mut self, ctx: &mut GameContext, delta: f32);

    /// Blend render state between the previous and current simulation step
    fn interpolate(&mut self, ctx: &mut GameContext, alpha: f32) {
        let _ = (ctx, alpha);
    }

    /// Emit draw calls for the current frame
    fn render(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        let _ = (ctx, graphics);
    }
}

/// Entity-id to entity mapping tracked by a system
///
/// Single writer (the simulation thread), any number of concurrent readers:
/// background tasks hold a clone and look entities up while the main loop
/// mutates the map between their reads.
#[derive(Clone, Default)]
pub struct EntityMap {
    inner: Arc<RwLock<HashMap<EntityId, Entity>>>,
}

impl EntityMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an entity
    pub fn track(&self, entity: Entity) {
        self.inner.write().unwrap().insert(entity.id(), entity);
    }

    /// Stop tracking an entity; `false` if it was not tracked
    pub fn untrack(&self, id: EntityId) -> bool {
        self.inner.write().unwrap().remove(&id).is_some()
    }

    /// Look up a tracked entity by id
    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.inner.read().unwrap().get(&id).cloned()
    }

    /// Whether an entity is tracked
    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.read().unwrap().contains_key(&id)
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Whether the map tracks nothing
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Snapshot of tracked ids, sorted for deterministic iteration
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.inner.read().unwrap().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityRegistry;

    fn tracked_entity(registry: &mut EntityRegistry) -> Entity {
        let id = registry.create();
        registry.get(id).cloned().expect("just created")
    }

    #[test]
    fn test_track_untrack_roundtrip() {
        let mut registry = EntityRegistry::new();
        let map = EntityMap::new();
        let entity = tracked_entity(&mut registry);
        let id = entity.id();

        map.track(entity);
        assert!(map.contains(id));
        assert_eq!(map.len(), 1);
        assert!(map.untrack(id));
        assert!(!map.untrack(id));
        assert!(map.is_empty());
    }

    #[test]
    fn test_ids_snapshot_is_sorted() {
        let mut registry = EntityRegistry::new();
        let map = EntityMap::new();
        let mut created = Vec::new();
        for _ in 0..5 {
            let entity = tracked_entity(&mut registry);
            created.push(entity.id());
            map.track(entity);
        }
        created.sort_unstable();
        assert_eq!(map.ids(), created);
    }

    #[test]
    fn test_concurrent_reads_during_writes() {
        let mut registry = EntityRegistry::new();
        let map = EntityMap::new();
        let reader = map.clone();

        let first = tracked_entity(&mut registry);
        let first_id = first.id();
        map.track(first);

        let handle = std::thread::spawn(move || {
            let mut hits = 0;
            for _ in 0..1000 {
                if reader.get(first_id).is_some() {
                    hits += 1;
                }
            }
            hits
        });

        for _ in 0..100 {
            let entity = tracked_entity(&mut registry);
            map.track(entity);
        }

        let hits = handle.join().expect("reader thread");
        assert_eq!(hits, 1000, "tracked entity stayed visible to readers");
        assert_eq!(map.len(), 101);
    }
}
