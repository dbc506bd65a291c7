//! Two-phase render pipeline
//!
//! Stages are executed once per render: `apply` runs over the stages in
//! order, each stage's `render` then runs inside the fully applied state, and
//! `unapply` runs in exactly the reverse order of `apply` so nested render
//! state (clips, transforms) unwinds like a stack. One-way mode skips
//! `unapply` entirely for stages that intentionally leave persistent render
//! state behind for a later external draw.

use super::Renderer;
use crate::runtime::GameContext;

/// Identifier for a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId(u64);

/// A render pipeline stage
///
/// Stages must tolerate frames on which they are skipped; the pipeline does
/// no per-stage skip bookkeeping.
pub trait RenderStage: Send {
    /// Advance stage state by one fixed step
    fn update(&mut self, ctx: &mut GameContext, delta: f32) {
        let _ = (ctx, delta);
    }

    /// Blend stage state with the leftover step fraction
    fn interpolate(&mut self, ctx: &mut GameContext, alpha: f32) {
        let _ = (ctx, alpha);
    }

    /// Push this stage's render state
    fn apply(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer);

    /// Draw inside the fully applied state
    fn render(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        let _ = (ctx, graphics);
    }

    /// Pop this stage's render state
    fn unapply(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer);
}

struct PipelineStage {
    id: StageId,
    stage: Box<dyn RenderStage>,
}

/// Ordered apply/unapply stage list executed once per render
#[derive(Default)]
pub struct RenderPipeline {
    stages: Vec<PipelineStage>,
    one_way: bool,
    next_id: u64,
}

impl RenderPipeline {
    /// Create an empty two-phase pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the pipeline
    pub fn add_stage(&mut self, stage: Box<dyn RenderStage>) -> StageId {
        let id = StageId(self.next_id);
        self.next_id += 1;
        self.stages.push(PipelineStage { id, stage });
        id
    }

    /// Remove a stage; `false` if the id is unknown
    pub fn remove_stage(&mut self, id: StageId) -> bool {
        let before = self.stages.len();
        self.stages.retain(|s| s.id != id);
        before != self.stages.len()
    }

    /// Switch between two-phase and one-way execution
    ///
    /// In one-way mode `unapply` is never invoked.
    pub fn set_one_way(&mut self, one_way: bool) {
        self.one_way = one_way;
    }

    /// Whether the pipeline runs in one-way mode
    pub fn is_one_way(&self) -> bool {
        self.one_way
    }

    /// Forward one fixed-step update to every stage in order
    pub fn update(&mut self, ctx: &mut GameContext, delta: f32) {
        for entry in &mut self.stages {
            entry.stage.update(ctx, delta);
        }
    }

    /// Forward the interpolation pass to every stage in order
    pub fn interpolate(&mut self, ctx: &mut GameContext, alpha: f32) {
        for entry in &mut self.stages {
            entry.stage.interpolate(ctx, alpha);
        }
    }

    /// Execute one render pass
    ///
    /// Applies stages in order, renders each inside the applied state, then
    /// unapplies in reverse order unless one-way mode is set.
    pub fn render(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        for entry in &mut self.stages {
            entry.stage.apply(ctx, graphics);
        }
        for entry in &mut self.stages {
            entry.stage.render(ctx, graphics);
        }
        if !self.one_way {
            for entry in self.stages.iter_mut().rev() {
                entry.stage.unapply(ctx, graphics);
            }
        }
    }

    /// Number of stages in the pipeline
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoopConfig;
    use crate::graphics::NullRenderer;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct TracingStage {
        tag: &'static str,
        log: CallLog,
    }

    impl RenderStage for TracingStage {
        fn apply(&mut self, _ctx: &mut GameContext, _graphics: &mut dyn Renderer) {
            self.log.lock().unwrap().push(format!("apply({})", self.tag));
        }

        fn unapply(&mut self, _ctx: &mut GameContext, _graphics: &mut dyn Renderer) {
            self.log.lock().unwrap().push(format!("unapply({})", self.tag));
        }
    }

    fn pipeline_with_stages(log: &CallLog) -> RenderPipeline {
        let mut pipeline = RenderPipeline::new();
        for tag in ["A", "B", "C"] {
            pipeline.add_stage(Box::new(TracingStage { tag, log: log.clone() }));
        }
        pipeline
    }

    fn context() -> GameContext {
        GameContext::new(&LoopConfig::default()).expect("valid default config")
    }

    #[test]
    fn test_two_phase_stack_discipline() {
        let log: CallLog = CallLog::default();
        let mut pipeline = pipeline_with_stages(&log);
        let mut ctx = context();
        let mut renderer = NullRenderer::new();

        pipeline.render(&mut ctx, &mut renderer);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "apply(A)",
                "apply(B)",
                "apply(C)",
                "unapply(C)",
                "unapply(B)",
                "unapply(A)",
            ]
        );
    }

    #[test]
    fn test_one_way_mode_skips_unapply() {
        let log: CallLog = CallLog::default();
        let mut pipeline = pipeline_with_stages(&log);
        pipeline.set_one_way(true);
        let mut ctx = context();
        let mut renderer = NullRenderer::new();

        pipeline.render(&mut ctx, &mut renderer);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["apply(A)", "apply(B)", "apply(C)"]
        );
    }

    #[test]
    fn test_balanced_across_repeated_renders() {
        let log: CallLog = CallLog::default();
        let mut pipeline = pipeline_with_stages(&log);
        let mut ctx = context();
        let mut renderer = NullRenderer::new();

        pipeline.render(&mut ctx, &mut renderer);
        pipeline.render(&mut ctx, &mut renderer);

        let calls = log.lock().unwrap();
        let applies = calls.iter().filter(|c| c.starts_with("apply")).count();
        let unapplies = calls.iter().filter(|c| c.starts_with("unapply")).count();
        assert_eq!(applies, unapplies);
    }

    #[test]
    fn test_remove_stage() {
        let log: CallLog = CallLog::default();
        let mut pipeline = RenderPipeline::new();
        let id = pipeline.add_stage(Box::new(TracingStage { tag: "A", log: log.clone() }));
        assert!(pipeline.remove_stage(id));
        assert!(!pipeline.remove_stage(id));
        assert!(pipeline.is_empty());
    }
}
