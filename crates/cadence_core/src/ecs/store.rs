//! Component storage with type and capability indexes
//!
//! The [`ComponentStore`] keeps per-entity collections of components indexed
//! by concrete type and by every capability tag the component declares.
//! Queries come back ordered by descending priority, with insertion order as
//! a deterministic tie-break. Components are stored behind `Arc` and tracked
//! by allocation identity: one instance belongs to at most one entity at a
//! time, and a second `add` of an owned instance fails without mutating
//! either entity's collection.

use super::component::{CapabilityId, Component};
use super::entity::EntityId;
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Component storage errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The component instance already belongs to an entity
    #[error("component already owned by entity {owner}, cannot attach to entity {attempted}")]
    ComponentOwnership {
        /// Entity currently owning the instance
        owner: EntityId,
        /// Entity the caller tried to attach it to
        attempted: EntityId,
    },

    /// The target entity is not registered
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// Sort key for stored components: descending priority, then insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OrderKey {
    priority: i32,
    seq: u64,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct StoredComponent {
    component: Arc<dyn Component>,
    // Second view of the same allocation, kept for typed downcasts.
    as_any: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    identity: usize,
}

/// Per-entity component collection with lazily created indexes
#[derive(Default)]
struct EntityComponents {
    entries: BTreeMap<OrderKey, StoredComponent>,
    by_type: HashMap<TypeId, BTreeSet<OrderKey>>,
    by_capability: HashMap<CapabilityId, BTreeSet<OrderKey>>,
    by_identity: HashMap<usize, OrderKey>,
}

impl EntityComponents {
    fn insert(&mut self, order: OrderKey, stored: StoredComponent, caps: &[CapabilityId]) {
        self.by_type.entry(stored.type_id).or_default().insert(order);
        for &cap in caps {
            self.by_capability.entry(cap).or_default().insert(order);
        }
        self.by_identity.insert(stored.identity, order);
        self.entries.insert(order, stored);
    }

    fn remove(&mut self, order: OrderKey) -> Option<StoredComponent> {
        let stored = self.entries.remove(&order)?;
        self.by_identity.remove(&stored.identity);
        if let Some(set) = self.by_type.get_mut(&stored.type_id) {
            set.remove(&order);
        }
        for &cap in stored.component.capabilities() {
            if let Some(set) = self.by_capability.get_mut(&cap) {
                set.remove(&order);
            }
        }
        Some(stored)
    }
}

/// Per-entity typed component collections with ownership tracking
///
/// Mutated only from the simulation thread; background work reads component
/// state through `Arc` clones handed out by queries.
#[derive(Default)]
pub struct ComponentStore {
    entities: HashMap<EntityId, EntityComponents>,
    owners: HashMap<usize, EntityId>,
    next_seq: u64,
}

impl ComponentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a component instance to an entity
    ///
    /// The component's priority and capability tags are sampled here, at
    /// attach time. Fails with [`StoreError::ComponentOwnership`] if the
    /// instance is already attached anywhere (including to `entity` itself);
    /// a failed add leaves every collection unchanged.
    pub fn add<C: Component>(
        &mut self,
        entity: EntityId,
        component: Arc<C>,
    ) -> Result<(), StoreError> {
        let identity = identity_of(&component);
        if let Some(&owner) = self.owners.get(&identity) {
            return Err(StoreError::ComponentOwnership {
                owner,
                attempted: entity,
            });
        }

        let order = OrderKey {
            priority: component.priority(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let caps = component.capabilities();
        let as_any: Arc<dyn Any + Send + Sync> = component.clone();
        let stored = StoredComponent {
            type_id: TypeId::of::<C>(),
            identity,
            as_any,
            component,
        };

        self.entities
            .entry(entity)
            .or_default()
            .insert(order, stored, caps);
        self.owners.insert(identity, entity);
        Ok(())
    }

    /// Detach a component instance from an entity
    ///
    /// Removing an instance that is not attached to `entity` is a no-op
    /// reporting `false`.
    pub fn remove<C: Component>(&mut self, entity: EntityId, component: &Arc<C>) -> bool {
        self.remove_by_identity(entity, identity_of(component))
    }

    /// Detach a component obtained from a trait-object query
    pub fn remove_dyn(&mut self, entity: EntityId, component: &Arc<dyn Component>) -> bool {
        self.remove_by_identity(entity, identity_of_dyn(component))
    }

    /// Detach every component of concrete type `C` from an entity
    pub fn remove_all_of_type<C: Component>(&mut self, entity: EntityId) -> usize {
        let Some(slot) = self.entities.get_mut(&entity) else {
            return 0;
        };
        let Some(orders) = slot.by_type.remove(&TypeId::of::<C>()) else {
            return 0;
        };
        let mut removed = 0;
        for order in orders {
            if let Some(stored) = slot.remove(order) {
                self.owners.remove(&stored.identity);
                removed += 1;
            }
        }
        removed
    }

    /// Components of concrete type `C` attached to an entity, in order
    pub fn query_by_type<C: Component>(&self, entity: EntityId) -> Vec<Arc<C>> {
        let Some(slot) = self.entities.get(&entity) else {
            return Vec::new();
        };
        let Some(orders) = slot.by_type.get(&TypeId::of::<C>()) else {
            return Vec::new();
        };
        orders
            .iter()
            .filter_map(|order| slot.entries.get(order))
            .filter_map(|stored| stored.as_any.clone().downcast::<C>().ok())
            .collect()
    }

    /// Components declaring `capability`, across concrete types, in order
    pub fn query_by_capability(
        &self,
        entity: EntityId,
        capability: CapabilityId,
    ) -> Vec<Arc<dyn Component>> {
        let Some(slot) = self.entities.get(&entity) else {
            return Vec::new();
        };
        let Some(orders) = slot.by_capability.get(&capability) else {
            return Vec::new();
        };
        orders
            .iter()
            .filter_map(|order| slot.entries.get(order))
            .map(|stored| stored.component.clone())
            .collect()
    }

    /// Every component attached to an entity, in order
    pub fn components(&self, entity: EntityId) -> Vec<Arc<dyn Component>> {
        self.entities
            .get(&entity)
            .map(|slot| slot.entries.values().map(|s| s.component.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of components attached to an entity
    pub fn component_count(&self, entity: EntityId) -> usize {
        self.entities.get(&entity).map_or(0, |slot| slot.entries.len())
    }

    /// Drop an entity's collection and release ownership of its components
    pub(super) fn remove_entity(&mut self, entity: EntityId) {
        if let Some(slot) = self.entities.remove(&entity) {
            for stored in slot.entries.values() {
                self.owners.remove(&stored.identity);
            }
        }
    }

    fn remove_by_identity(&mut self, entity: EntityId, identity: usize) -> bool {
        let Some(slot) = self.entities.get_mut(&entity) else {
            return false;
        };
        let Some(&order) = slot.by_identity.get(&identity) else {
            return false;
        };
        if slot.remove(order).is_some() {
            self.owners.remove(&identity);
            true
        } else {
            false
        }
    }
}

fn identity_of<C: Component>(component: &Arc<C>) -> usize {
    Arc::as_ptr(component).cast::<()>() as usize
}

fn identity_of_dyn(component: &Arc<dyn Component>) -> usize {
    Arc::as_ptr(component) as *const () as usize
}
