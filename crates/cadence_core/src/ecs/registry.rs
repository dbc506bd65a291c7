//! Entity registry with lifecycle listeners
//!
//! The [`EntityRegistry`] owns every entity and the component store behind
//! them. Ids are allocated monotonically and never reused in-process.
//! Lifecycle listeners are notified in registration order; a panicking
//! listener is logged and isolated so the remaining listeners still run and
//! the triggering operation still completes.

use super::component::{CapabilityId, Component};
use super::entity::{Entity, EntityId};
use super::store::{ComponentStore, StoreError};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Observer for entity creation and deletion
///
/// `before_entity_deleted` fires while the entity and its components are
/// still fully queryable; `after_entity_created` fires only once the entity
/// is registered.
pub trait EntityLifecycleListener: Send + Sync {
    /// Called after an entity is fully registered and queryable
    fn after_entity_created(&self, registry: &EntityRegistry, id: EntityId) {
        let _ = (registry, id);
    }

    /// Called before an entity is removed, while its final state is queryable
    fn before_entity_deleted(&self, registry: &EntityRegistry, id: EntityId) {
        let _ = (registry, id);
    }
}

/// Owns entities, allocates ids and dispatches lifecycle notifications
pub struct EntityRegistry {
    next_id: u64,
    entities: HashMap<EntityId, Entity>,
    store: ComponentStore,
    listeners: Vec<Arc<dyn EntityLifecycleListener>>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entities: HashMap::new(),
            store: ComponentStore::new(),
            listeners: Vec::new(),
        }
    }

    /// Create a new entity and notify listeners
    pub fn create(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id));
        log::trace!("created entity {id}");
        self.notify(id, "after_entity_created", |listener, registry| {
            listener.after_entity_created(registry, id);
        });
        id
    }

    /// Destroy an entity, notifying listeners before removal
    ///
    /// Children of the destroyed entity are detached, not destroyed.
    /// Returns `false` if the entity was not registered.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        self.notify(id, "before_entity_deleted", |listener, registry| {
            listener.before_entity_deleted(registry, id);
        });

        if let Some(entity) = self.entities.remove(&id) {
            if let Some(parent) = entity.parent() {
                if let Some(parent_entity) = self.entities.get_mut(&parent) {
                    parent_entity.remove_child(id);
                }
            }
            for &child in entity.children() {
                if let Some(child_entity) = self.entities.get_mut(&child) {
                    child_entity.set_parent(None);
                }
            }
        }
        self.store.remove_entity(id);
        log::trace!("destroyed entity {id}");
        true
    }

    /// Look up an entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Whether an entity is currently registered
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach `child` under `parent`, or detach it when `parent` is `None`
    ///
    /// Refuses attachments that would form a cycle. Returns `false` if either
    /// entity is unknown or the attachment was refused.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        if !self.entities.contains_key(&child) {
            return false;
        }
        if let Some(parent) = parent {
            if parent == child || !self.entities.contains_key(&parent) {
                return false;
            }
            if self.is_ancestor(child, parent) {
                return false;
            }
        }

        let old_parent = self.entities.get(&child).and_then(Entity::parent);
        if let Some(old) = old_parent {
            if let Some(old_entity) = self.entities.get_mut(&old) {
                old_entity.remove_child(child);
            }
        }
        if let Some(parent) = parent {
            if let Some(parent_entity) = self.entities.get_mut(&parent) {
                parent_entity.add_child(child);
            }
        }
        if let Some(child_entity) = self.entities.get_mut(&child) {
            child_entity.set_parent(parent);
        }
        true
    }

    /// Children of an entity, in attachment order
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.entities.get(&id).map_or(&[][..], Entity::children)
    }

    /// Register a lifecycle listener; notification order is registration order
    pub fn add_listener(&mut self, listener: Arc<dyn EntityLifecycleListener>) {
        self.listeners.push(listener);
    }

    /// Remove a previously registered listener (by instance identity)
    pub fn remove_listener(&mut self, listener: &Arc<dyn EntityLifecycleListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        before != self.listeners.len()
    }

    /// Attach a component to an entity
    pub fn add_component<C: Component>(
        &mut self,
        id: EntityId,
        component: Arc<C>,
    ) -> Result<(), StoreError> {
        if !self.entities.contains_key(&id) {
            return Err(StoreError::UnknownEntity(id));
        }
        self.store.add(id, component)
    }

    /// Detach a component from an entity; `false` if it was not attached
    pub fn remove_component<C: Component>(&mut self, id: EntityId, component: &Arc<C>) -> bool {
        self.store.remove(id, component)
    }

    /// Detach every component of type `C` from an entity
    pub fn remove_all_of_type<C: Component>(&mut self, id: EntityId) -> usize {
        self.store.remove_all_of_type::<C>(id)
    }

    /// Components of type `C` on an entity, in priority order
    pub fn components_of<C: Component>(&self, id: EntityId) -> Vec<Arc<C>> {
        self.store.query_by_type::<C>(id)
    }

    /// Components declaring `capability` on an entity, in priority order
    pub fn components_with(
        &self,
        id: EntityId,
        capability: CapabilityId,
    ) -> Vec<Arc<dyn Component>> {
        self.store.query_by_capability(id, capability)
    }

    /// The backing component store
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Mutable access to the backing component store
    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    fn is_ancestor(&self, candidate: EntityId, of: EntityId) -> bool {
        let mut current = self.entities.get(&of).and_then(Entity::parent);
        while let Some(ancestor) = current {
            if ancestor == candidate {
                return true;
            }
            current = self.entities.get(&ancestor).and_then(Entity::parent);
        }
        false
    }

    /// Notify all listeners, isolating panics per listener
    fn notify(
        &self,
        id: EntityId,
        event: &str,
        call: impl Fn(&dyn EntityLifecycleListener, &Self),
    ) {
        // Snapshot so a listener mutating the list cannot invalidate the walk.
        let snapshot = self.listeners.clone();
        for listener in snapshot {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| call(listener.as_ref(), self)));
            if outcome.is_err() {
                log::error!("entity lifecycle listener panicked (event: {event}, entity: {id})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Marker;
    impl Component for Marker {}

    #[derive(Default)]
    struct CountingListener {
        created: AtomicUsize,
        deleted: AtomicUsize,
    }

    impl EntityLifecycleListener for CountingListener {
        fn after_entity_created(&self, _registry: &EntityRegistry, _id: EntityId) {
            self.created.fetch_add(1, Ordering::SeqCst);
        }

        fn before_entity_deleted(&self, _registry: &EntityRegistry, _id: EntityId) {
            self.deleted.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingListener;

    impl EntityLifecycleListener for PanickingListener {
        fn after_entity_created(&self, _registry: &EntityRegistry, _id: EntityId) {
            panic!("listener failure");
        }
    }

    struct OrderListener {
        tag: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl EntityLifecycleListener for OrderListener {
        fn after_entity_created(&self, _registry: &EntityRegistry, _id: EntityId) {
            self.order.lock().unwrap().push(self.tag);
        }
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut registry = EntityRegistry::new();
        let first = registry.create();
        registry.destroy(first);
        let second = registry.create();
        assert!(second > first);
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn test_create_notifies_after_registration() {
        struct QueryingListener {
            observed: AtomicUsize,
        }
        impl EntityLifecycleListener for QueryingListener {
            fn after_entity_created(&self, registry: &EntityRegistry, id: EntityId) {
                if registry.get(id).is_some() {
                    self.observed.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let mut registry = EntityRegistry::new();
        let listener = Arc::new(QueryingListener {
            observed: AtomicUsize::new(0),
        });
        registry.add_listener(listener.clone());
        registry.create();
        assert_eq!(listener.observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_panic_does_not_block_remaining_listeners() {
        let mut registry = EntityRegistry::new();
        let counting = Arc::new(CountingListener::default());
        registry.add_listener(Arc::new(PanickingListener));
        registry.add_listener(counting.clone());

        let id = registry.create();
        assert!(registry.get(id).is_some(), "creation still succeeds");
        assert_eq!(counting.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listeners_notified_in_registration_order() {
        let mut registry = EntityRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        registry.add_listener(Arc::new(OrderListener {
            tag: "first",
            order: order.clone(),
        }));
        registry.add_listener(Arc::new(OrderListener {
            tag: "second",
            order: order.clone(),
        }));
        registry.create();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_deletion_listener_sees_final_component_state() {
        struct FinalStateListener {
            seen_components: AtomicUsize,
        }
        impl EntityLifecycleListener for FinalStateListener {
            fn before_entity_deleted(&self, registry: &EntityRegistry, id: EntityId) {
                self.seen_components
                    .store(registry.components_of::<Marker>(id).len(), Ordering::SeqCst);
            }
        }

        let mut registry = EntityRegistry::new();
        let listener = Arc::new(FinalStateListener {
            seen_components: AtomicUsize::new(0),
        });
        registry.add_listener(listener.clone());

        let id = registry.create();
        registry.add_component(id, Arc::new(Marker)).expect("add component");
        assert!(registry.destroy(id));

        assert_eq!(listener.seen_components.load(Ordering::SeqCst), 1);
        assert!(registry.get(id).is_none());
        assert!(registry.components_of::<Marker>(id).is_empty());
    }

    #[test]
    fn test_destroy_counts_and_unknown_destroy() {
        let mut registry = EntityRegistry::new();
        let counting = Arc::new(CountingListener::default());
        registry.add_listener(counting.clone());

        let id = registry.create();
        assert!(registry.destroy(id));
        assert!(!registry.destroy(id), "second destroy is a no-op");
        assert_eq!(counting.deleted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener_stops_notifications() {
        let mut registry = EntityRegistry::new();
        let counting = Arc::new(CountingListener::default());
        let handle: Arc<dyn EntityLifecycleListener> = counting.clone();
        registry.add_listener(handle.clone());
        registry.create();
        assert!(registry.remove_listener(&handle));
        registry.create();
        assert_eq!(counting.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parent_child_links() {
        let mut registry = EntityRegistry::new();
        let parent = registry.create();
        let child = registry.create();

        assert!(registry.set_parent(child, Some(parent)));
        assert_eq!(registry.children(parent), &[child]);
        assert_eq!(registry.get(child).and_then(Entity::parent), Some(parent));

        // Cycles are refused.
        assert!(!registry.set_parent(parent, Some(child)));

        assert!(registry.set_parent(child, None));
        assert!(registry.children(parent).is_empty());
    }

    #[test]
    fn test_destroying_parent_detaches_children() {
        let mut registry = EntityRegistry::new();
        let parent = registry.create();
        let child = registry.create();
        registry.set_parent(child, Some(parent));

        registry.destroy(parent);
        assert!(registry.contains(child));
        assert_eq!(registry.get(child).and_then(Entity::parent), None);
    }

    #[test]
    fn test_add_component_to_unknown_entity() {
        let mut registry = EntityRegistry::new();
        let id = registry.create();
        registry.destroy(id);
        assert_eq!(
            registry.add_component(id, Arc::new(Marker)),
            Err(StoreError::UnknownEntity(id))
        );
    }
}
