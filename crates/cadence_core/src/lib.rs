//! # Cadence Core
//!
//! The fixed-timestep core of a cross-platform 2D game framework.
//!
//! ## Features
//!
//! - **Fixed Timestep**: accumulator-based step decomposition with render
//!   interpolation and spiral-of-death protection
//! - **ECS Architecture**: entities as ids, components as typed capabilities
//!   with priority-ordered queries, systems as composable traits
//! - **Two-Phase Render Pipeline**: apply/unapply stage stacking with an
//!   optional one-way mode
//! - **Deferred Tasks**: cross-thread runnables drained once per frame,
//!   background workers with pollable handles, pooled frame-spread tasks
//! - **Backend Agnostic**: rendering and input consumed through narrow
//!   traits; runs headless
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cadence_core::prelude::*;
//!
//! struct Spinner;
//!
//! impl System for Spinner {
//!     fn update(&mut self, _ctx: &mut GameContext, _delta: f32) {
//!         // advance simulation by one fixed step
//!     }
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = LoopConfig::default();
//!     let input = Box::new(QueuedInputSource::new());
//!     let mut frame_loop = FrameLoop::new(config, input)?;
//!     frame_loop.scheduler_mut().add_system(Box::new(Spinner));
//!
//!     let mut renderer = NullRenderer::new();
//!     let mut now = 0u64;
//!     loop {
//!         now += 16_666_667; // host-supplied monotonic clock
//!         frame_loop.on_frame(now, &mut renderer);
//!         if frame_loop.is_destroyed() {
//!             break Ok(());
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod ecs;
pub mod foundation;
pub mod graphics;
pub mod input;
pub mod runtime;
pub mod tasks;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{ConfigError, LoopConfig},
        ecs::{
            CapabilityId, Component, Entity, EntityId, EntityLifecycleListener, EntityMap,
            EntityRegistry, StoreError, System, SystemId, SystemScheduler,
        },
        foundation::{Pool, SharedPool, StepOutput, TimeAccumulator},
        graphics::{NullRenderer, RenderPipeline, RenderStage, Renderer, StageId},
        input::{InputEvent, InputSource, QueuedInputSource},
        runtime::{ApplicationLifecycleListener, FrameLoop, GameContext, LifecycleFlags},
        tasks::{
            FrameSpreadHandle, FrameSpreadScheduler, FrameSpreadTask, FrameTaskHandle,
            FrameTaskQueue, TaskExecutor, TaskHandle, TaskOutcome,
        },
    };
}
