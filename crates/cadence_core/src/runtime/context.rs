//! Game context
//!
//! The aggregate handed to systems and pipeline stages each frame: the
//! entity registry (and its component store), the deferred frame-task queue
//! and the background task executor. Entity and component state is mutated
//! only through this context on the simulation thread; background work
//! communicates back through the task queue.

use crate::core::config::{ConfigError, LoopConfig};
use crate::ecs::EntityRegistry;
use crate::tasks::{FrameTaskQueue, TaskExecutor};

/// Shared engine state visible to systems and render stages
pub struct GameContext {
    registry: EntityRegistry,
    frame_tasks: FrameTaskQueue,
    executor: TaskExecutor,
}

impl GameContext {
    /// Create a context from a validated configuration
    pub fn new(config: &LoopConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: EntityRegistry::new(),
            frame_tasks: FrameTaskQueue::new(),
            executor: TaskExecutor::new(config.task_workers)?,
        })
    }

    /// The entity registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Mutable access to the entity registry
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Deferred runnable queue drained once per frame
    ///
    /// The queue is cloneable; hand clones to background tasks that need to
    /// push results back onto the simulation thread.
    pub fn frame_tasks(&self) -> &FrameTaskQueue {
        &self.frame_tasks
    }

    /// Background task executor
    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }
}
