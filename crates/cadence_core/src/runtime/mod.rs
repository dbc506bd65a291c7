//! Runtime module - frame loop, game context and lifecycle plumbing

pub mod context;
pub mod frame_loop;
pub mod lifecycle;

pub use context::GameContext;
pub use frame_loop::FrameLoop;
pub use lifecycle::{ApplicationLifecycleListener, LifecycleFlags};
