//! Entity implementation

use std::fmt;

/// Entity identifier
///
/// Ids are allocated monotonically by the registry and never reused within
/// a process lifetime, so a stale id can never alias a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub(super) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value of the id
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity: an id plus optional membership in a parent/child tree
///
/// Composite screens attach child entities under a parent; the tree carries
/// no behavior of its own. Components live in the registry's store, not here.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

impl Entity {
    pub(super) fn new(id: EntityId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Parent entity, if attached
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child entities in attachment order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub(super) fn set_parent(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(super) fn add_child(&mut self, child: EntityId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(super) fn remove_child(&mut self, child: EntityId) {
        self.children.retain(|&c| c != child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_tree_links() {
        let mut parent = Entity::new(EntityId::new(1));
        parent.add_child(EntityId::new(2));
        parent.add_child(EntityId::new(3));
        parent.add_child(EntityId::new(2)); // duplicate ignored
        assert_eq!(parent.children(), &[EntityId::new(2), EntityId::new(3)]);

        parent.remove_child(EntityId::new(2));
        assert_eq!(parent.children(), &[EntityId::new(3)]);
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::new(42).to_string(), "#42");
    }
}
