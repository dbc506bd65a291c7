//! Entity-Component-System implementation
//!
//! Entities are plain ids owned by the [`EntityRegistry`]; components are
//! typed capabilities held in the [`ComponentStore`]; behavior lives in
//! [`System`] implementations driven by the [`SystemScheduler`]. Composition
//! over inheritance throughout: there is no base entity or system type to
//! subclass.

pub mod component;
pub mod entity;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod system;

pub use component::{AsAny, CapabilityId, Component};
pub use entity::{Entity, EntityId};
pub use registry::{EntityLifecycleListener, EntityRegistry};
pub use scheduler::{SystemId, SystemScheduler};
pub use store::{ComponentStore, StoreError};
pub use system::{EntityMap, System};
