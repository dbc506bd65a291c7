//! System scheduling
//!
//! The [`SystemScheduler`] keeps an ordered list of systems and forwards
//! update, interpolate and render calls in registration order. Additions and
//! removals are deferred to the next frame boundary so the system set stays
//! stable across one frame's update/interpolate/render passes, and a system
//! removed mid-frame is tolerated rather than invalidating iteration.
//!
//! Each forwarded call is isolated: a panicking system is logged and skipped
//! for the rest of the pass without halting the frame.

use super::system::System;
use crate::graphics::Renderer;
use crate::runtime::GameContext;
use std::panic::{self, AssertUnwindSafe};

/// Unique identifier for a scheduled system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(u64);

struct ScheduledSystem {
    id: SystemId,
    system: Box<dyn System>,
}

/// Ordered list of systems with deferred add/remove
#[derive(Default)]
pub struct SystemScheduler {
    systems: Vec<ScheduledSystem>,
    pending_additions: Vec<ScheduledSystem>,
    pending_removals: Vec<SystemId>,
    next_id: u64,
}

impl SystemScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a system for addition at the next frame boundary
    pub fn add_system(&mut self, system: Box<dyn System>) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        self.pending_additions.push(ScheduledSystem { id, system });
        id
    }

    /// Queue a system for removal at the next frame boundary
    ///
    /// Returns `false` if the id is neither scheduled nor pending addition.
    pub fn remove_system(&mut self, id: SystemId) -> bool {
        let known = self.systems.iter().any(|s| s.id == id)
            || self.pending_additions.iter().any(|s| s.id == id);
        if known {
            self.pending_removals.push(id);
        }
        known
    }

    /// Apply pending additions and removals; called once per frame
    pub fn begin_frame(&mut self) {
        if !self.pending_additions.is_empty() {
            self.systems.append(&mut self.pending_additions);
        }
        if !self.pending_removals.is_empty() {
            let removals = std::mem::take(&mut self.pending_removals);
            self.systems.retain(|s| !removals.contains(&s.id));
        }
    }

    /// Forward one fixed-step update to every system in order
    pub fn update(&mut self, ctx: &mut GameContext, delta: f32) {
        for entry in &mut self.systems {
            let id = entry.id;
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| entry.system.update(ctx, delta)));
            if outcome.is_err() {
                log::error!("system {id:?} panicked during update; frame continues");
            }
        }
    }

    /// Forward the per-frame interpolation pass to every system in order
    pub fn interpolate(&mut self, ctx: &mut GameContext, alpha: f32) {
        for entry in &mut self.systems {
            let id = entry.id;
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| entry.system.interpolate(ctx, alpha)));
            if outcome.is_err() {
                log::error!("system {id:?} panicked during interpolate; frame continues");
            }
        }
    }

    /// Forward the render pass to every system in order
    pub fn render(&mut self, ctx: &mut GameContext, graphics: &mut dyn Renderer) {
        for entry in &mut self.systems {
            let id = entry.id;
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| entry.system.render(ctx, graphics)));
            if outcome.is_err() {
                log::error!("system {id:?} panicked during render; frame continues");
            }
        }
    }

    /// Number of active systems (excluding pending additions)
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether no systems are active
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
