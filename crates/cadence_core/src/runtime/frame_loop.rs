//! Frame loop driver
//!
//! [`FrameLoop::on_frame`] is the sole external entry point, called by the
//! host's render callback each display refresh with a monotonic timestamp.
//! Per frame, in order:
//!
//! 1. capture lifecycle requests under a single critical section
//! 2. resume-notify (and zero the next measured delta)
//! 3. per fixed step: drain input, update systems and pipeline stages
//! 4. interpolate once with the leftover step fraction
//! 5. drain deferred cross-thread runnables
//! 6. step frame-spread tasks under the per-frame budget
//! 7. render (systems, then the staged pipeline)
//! 8. pause-notify, then destroy-notify
//!
//! Listeners therefore observe a resume before any update of the same
//! frame, and a destroy only after that frame's final render.

use super::context::GameContext;
use super::lifecycle::{ApplicationLifecycleListener, LifecycleFlags, LifecycleRequests};
use crate::core::config::{ConfigError, LoopConfig};
use crate::ecs::SystemScheduler;
use crate::foundation::time::TimeAccumulator;
use crate::graphics::{RenderPipeline, Renderer};
use crate::input::InputSource;
use crate::tasks::FrameSpreadScheduler;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const NANOS_PER_SECOND: f32 = 1_000_000_000.0;

/// Top-level fixed-timestep driver
pub struct FrameLoop {
    context: GameContext,
    scheduler: SystemScheduler,
    pipeline: RenderPipeline,
    frame_spread: FrameSpreadScheduler,
    accumulator: TimeAccumulator,
    input: Box<dyn InputSource>,
    lifecycle: LifecycleFlags,
    listeners: Vec<Arc<dyn ApplicationLifecycleListener>>,
    last_nanos: Option<u64>,
    frame_index: u64,
    destroyed: bool,
}

impl FrameLoop {
    /// Create a frame loop from a validated configuration
    pub fn new(config: LoopConfig, input: Box<dyn InputSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "initializing frame loop (timestep {:.4}s, max delta {:.4}s)",
            config.target_timestep_secs,
            config.maximum_delta_secs
        );
        Ok(Self {
            context: GameContext::new(&config)?,
            scheduler: SystemScheduler::new(),
            pipeline: RenderPipeline::new(),
            frame_spread: FrameSpreadScheduler::new(config.max_frame_tasks),
            accumulator: TimeAccumulator::new(&config)?,
            input,
            lifecycle: LifecycleFlags::new(),
            listeners: Vec::new(),
            last_nanos: None,
            frame_index: 0,
            destroyed: false,
        })
    }

    /// Drive one frame from the host's render callback
    ///
    /// `now_nanos` is a monotonic timestamp; the first call establishes the
    /// baseline and runs with a zero delta. Calls after destruction are
    /// no-ops.
    pub fn on_frame(&mut self, now_nanos: u64, graphics: &mut dyn Renderer) {
        if self.destroyed {
            return;
        }

        let requests = self.lifecycle.take();
        if requests.contains(LifecycleRequests::RESUME) {
            log::info!("frame loop resumed");
            self.accumulator.resume();
            self.notify_lifecycle("resume", |listener| listener.resume());
        }

        let delta_seconds = self
            .last_nanos
            .map_or(0.0, |prev| now_nanos.saturating_sub(prev) as f32 / NANOS_PER_SECOND);
        self.last_nanos = Some(now_nanos);

        self.scheduler.begin_frame();

        let output = self.accumulator.tick(delta_seconds);
        let fixed_delta = self.accumulator.target_timestep();
        for _ in 0..output.steps {
            self.input.process_events();
            self.scheduler.update(&mut self.context, fixed_delta);
            self.pipeline.update(&mut self.context, fixed_delta);
        }
        self.scheduler.interpolate(&mut self.context, output.alpha);
        self.pipeline.interpolate(&mut self.context, output.alpha);

        self.context.frame_tasks().drain();
        self.frame_spread.step_frame(&mut self.context);

        self.scheduler.render(&mut self.context, graphics);
        self.pipeline.render(&mut self.context, graphics);

        if requests.contains(LifecycleRequests::PAUSE) {
            log::info!("frame loop paused");
            self.notify_lifecycle("pause", |listener| listener.pause());
        }
        if requests.contains(LifecycleRequests::DESTROY) {
            log::info!("frame loop destroyed after frame {}", self.frame_index);
            self.notify_lifecycle("dispose", |listener| listener.dispose());
            self.destroyed = true;
        }

        self.frame_index += 1;
    }

    /// Handle for requesting pause/resume/destroy from any thread
    pub fn lifecycle(&self) -> LifecycleFlags {
        self.lifecycle.clone()
    }

    /// Register an application lifecycle listener
    pub fn add_lifecycle_listener(&mut self, listener: Arc<dyn ApplicationLifecycleListener>) {
        self.listeners.push(listener);
    }

    /// The shared game context
    pub fn context(&self) -> &GameContext {
        &self.context
    }

    /// Mutable access to the shared game context
    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.context
    }

    /// The system scheduler
    pub fn scheduler_mut(&mut self) -> &mut SystemScheduler {
        &mut self.scheduler
    }

    /// The render pipeline
    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    /// The frame-spread task scheduler
    pub fn frame_spread_mut(&mut self) -> &mut FrameSpreadScheduler {
        &mut self.frame_spread
    }

    /// Number of frames driven so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether the loop has processed a destroy request
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn notify_lifecycle(&self, event: &str, call: impl Fn(&dyn ApplicationLifecycleListener)) {
        for listener in self.listeners.clone() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(listener.as_ref())));
            if outcome.is_err() {
                log::error!("application lifecycle listener panicked (event: {event})");
            }
        }
    }
}
