//! Time management utilities
//!
//! The [`TimeAccumulator`] converts variable wall-clock frame deltas into a
//! whole number of fixed-size simulation steps plus a leftover interpolation
//! fraction. Simulation code runs once per fixed step; render code blends
//! between the previous and current simulation state using the fraction.

use crate::core::config::{ConfigError, LoopConfig};

/// Result of feeding one frame's delta to the accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    /// Number of fixed simulation steps to run this frame
    pub steps: u32,

    /// Interpolation fraction of the pending step, always in `[0, 1)`
    pub alpha: f32,
}

/// Fixed-timestep accumulator
///
/// Invariant: after every [`tick`](Self::tick) the internal accumulator
/// satisfies `0 <= accumulator < target_timestep`.
#[derive(Debug)]
pub struct TimeAccumulator {
    target_timestep: f32,
    maximum_delta: f32,
    accumulator: f32,
    zero_next_delta: bool,
}

impl TimeAccumulator {
    /// Create an accumulator from a validated configuration
    pub fn new(config: &LoopConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            target_timestep: config.target_timestep_secs,
            maximum_delta: config.maximum_delta_secs,
            accumulator: 0.0,
            zero_next_delta: false,
        })
    }

    /// Feed one frame's raw delta and get back the fixed steps to run
    ///
    /// The raw delta is clamped to `[0, maximum_delta]` before accumulating,
    /// bounding the number of catch-up steps after a stall. If a resume was
    /// requested since the last tick the delta is forced to zero: wall time
    /// elapsed while suspended is meaningless to the simulation.
    pub fn tick(&mut self, raw_delta_seconds: f32) -> StepOutput {
        let delta = if self.zero_next_delta {
            self.zero_next_delta = false;
            0.0
        } else {
            raw_delta_seconds.clamp(0.0, self.maximum_delta)
        };

        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.target_timestep {
            self.accumulator -= self.target_timestep;
            steps += 1;
        }

        StepOutput {
            steps,
            alpha: self.accumulator / self.target_timestep,
        }
    }

    /// Force the next tick's delta to zero
    ///
    /// Called when the host resumes from a suspended state.
    pub fn resume(&mut self) {
        self.zero_next_delta = true;
    }

    /// The fixed simulation timestep in seconds
    pub fn target_timestep(&self) -> f32 {
        self.target_timestep
    }

    /// The per-frame delta cap in seconds
    pub fn maximum_delta(&self) -> f32 {
        self.maximum_delta
    }

    /// Unconsumed simulation time in seconds
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }
}
