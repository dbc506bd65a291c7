//! Component trait and capability tags
//!
//! A component is a typed capability attached to an entity. The store indexes
//! each component both by its concrete type and by every capability tag it
//! declares, so a capability query returns matching components across all
//! concrete types.

use std::any::Any;
use std::fmt;

/// Identifies a capability a component type declares
///
/// Capabilities are named constants shared between component definitions and
/// the code that queries for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityId(pub &'static str);

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Downcast support for trait-object components
pub trait AsAny {
    /// View the value as [`Any`] for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Trait for components attached to entities
///
/// Implementations override [`capabilities`](Self::capabilities) to be
/// discoverable by capability queries and [`priority`](Self::priority) to
/// control query ordering. Queries sort by descending priority with insertion
/// order as the tie-break, so components that keep the default priority of
/// zero come back in insertion order.
pub trait Component: AsAny + Send + Sync + 'static {
    /// Capability tags this component's type declares
    fn capabilities(&self) -> &'static [CapabilityId] {
        &[]
    }

    /// Sort key for capability queries; higher runs first
    fn priority(&self) -> i32 {
        0
    }
}
