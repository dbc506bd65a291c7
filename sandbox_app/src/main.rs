//! Headless sandbox application
//!
//! Drives the engine core without a rendering backend: a handful of moving
//! entities, a HUD render stage, a pooled frame-spread job and a background
//! duplication task, all pushed through a synthetic 60 Hz clock. Useful as a
//! smoke test and as a minimal integration example.

use cadence_core::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const MOVABLE: CapabilityId = CapabilityId("movable");
const FRAME_NANOS: u64 = 16_666_667; // ~60 Hz host refresh
const TOTAL_FRAMES: u64 = 300;

/// Position with previous-step state for render interpolation
struct Position {
    previous: Mutex<(f32, f32)>,
    current: Mutex<(f32, f32)>,
    velocity: (f32, f32),
}

impl Position {
    fn new(x: f32, y: f32, velocity: (f32, f32)) -> Self {
        Self {
            previous: Mutex::new((x, y)),
            current: Mutex::new((x, y)),
            velocity,
        }
    }

    fn advance(&self, delta: f32) {
        let mut current = self.current.lock().unwrap();
        *self.previous.lock().unwrap() = *current;
        current.0 += self.velocity.0 * delta;
        current.1 += self.velocity.1 * delta;
    }

    fn blended(&self, alpha: f32) -> (f32, f32) {
        let previous = *self.previous.lock().unwrap();
        let current = *self.current.lock().unwrap();
        (
            previous.0 + (current.0 - previous.0) * alpha,
            previous.1 + (current.1 - previous.1) * alpha,
        )
    }
}

impl Component for Position {
    fn capabilities(&self) -> &'static [CapabilityId] {
        &[MOVABLE]
    }
}

/// Advances every tracked entity's position once per fixed step
struct MovementSystem {
    tracked: EntityMap,
    steps: Arc<AtomicUsize>,
}

impl System for MovementSystem {
    fn update(&mut self, ctx: &mut GameContext, delta: f32) {
        for id in self.tracked.ids() {
            for position in ctx.registry().components_of::<Position>(id) {
                position.advance(delta);
            }
        }
        self.steps.fetch_add(1, Ordering::SeqCst);
    }

    fn interpolate(&mut self, ctx: &mut GameContext, alpha: f32) {
        for id in self.tracked.ids() {
            for position in ctx.registry().components_of::<Position>(id) {
                let (x, y) = position.blended(alpha);
                log::trace!("entity {id} blended to ({x:.2}, {y:.2})");
            }
        }
    }
}

/// Draws a one-line HUD inside the applied pipeline state
struct HudStage;

impl RenderStage for HudStage {
    fn apply(&mut self, _ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        graphics.begin_frame();
    }

    fn render(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        let entities = ctx.registry().entity_count();
        graphics.draw_text(&format!("entities: {entities}"), 4.0, 4.0);
    }

    fn unapply(&mut self, _ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        graphics.end_frame();
    }
}

/// Frame-spread job that fades a value a little each frame
struct FadeJob {
    remaining: u32,
}

impl FrameSpreadTask for FadeJob {
    fn step(&mut self, _ctx: &mut GameContext) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    fn reset(&mut self) {
        self.remaining = 0;
    }
}

struct ShutdownLogger;

impl ApplicationLifecycleListener for ShutdownLogger {
    fn pause(&self) {
        log::info!("application paused");
    }

    fn resume(&self) {
        log::info!("application resumed");
    }

    fn dispose(&self) {
        log::info!("application disposed");
    }
}

fn main() -> Result<(), ConfigError> {
    cadence_core::foundation::logging::init();
    log::info!("starting headless sandbox...");

    let input = QueuedInputSource::new();
    let input_queue = input.queue();
    let mut frame_loop = FrameLoop::new(LoopConfig::default(), Box::new(input))?;
    frame_loop.add_lifecycle_listener(Arc::new(ShutdownLogger));

    // Populate a few moving entities.
    let tracked = EntityMap::new();
    {
        let registry = frame_loop.context_mut().registry_mut();
        for i in 0..5 {
            let id = registry.create();
            let velocity = (1.0 + i as f32, 0.5 * i as f32);
            registry
                .add_component(id, Arc::new(Position::new(0.0, 0.0, velocity)))
                .expect("fresh component attaches");
            if let Some(entity) = registry.get(id) {
                tracked.track(entity.clone());
            }
        }
        log::info!("spawned {} entities", registry.entity_count());
    }

    let steps = Arc::new(AtomicUsize::new(0));
    frame_loop.scheduler_mut().add_system(Box::new(MovementSystem {
        tracked: tracked.clone(),
        steps: steps.clone(),
    }));
    frame_loop.pipeline_mut().add_stage(Box::new(HudStage));

    // A pooled multi-frame job and a background task reporting back through
    // the frame-task queue.
    let fade_pool: SharedPool<FadeJob> = cadence_core::foundation::pool::shared_pool();
    frame_loop
        .frame_spread_mut()
        .submit_pooled(FadeJob { remaining: 30 }, fade_pool.clone());

    let frame_tasks = frame_loop.context().frame_tasks().clone();
    let background = frame_loop.context().executor().submit(move || {
        let checksum: u64 = (0..1_000_000u64).sum();
        frame_tasks.submit(move || log::info!("background checksum ready: {checksum}"));
        checksum
    });

    // Synthetic host loop: inject some input, pause/resume midway, then
    // request destruction.
    let lifecycle = frame_loop.lifecycle();
    let mut renderer = NullRenderer::new();
    let mut now = 0u64;
    for frame in 0..TOTAL_FRAMES {
        now += FRAME_NANOS;
        match frame {
            30 => input_queue.push(InputEvent::KeyPressed(32)),
            120 => lifecycle.request_pause(),
            121 => lifecycle.request_resume(),
            f if f == TOTAL_FRAMES - 1 => lifecycle.request_destroy(),
            _ => {}
        }
        frame_loop.on_frame(now, &mut renderer);
    }

    match background.poll() {
        Some(TaskOutcome::Finished(checksum)) => log::info!("checksum: {checksum}"),
        other => log::warn!("background task not finished: {other:?}"),
    }

    log::info!(
        "ran {} frames, {} fixed steps, {} draw calls, fade jobs pooled: {}",
        frame_loop.frame_index(),
        steps.load(Ordering::SeqCst),
        renderer.draw_calls(),
        fade_pool.lock().unwrap().idle_count(),
    );
    assert!(frame_loop.is_destroyed());
    Ok(())
}
