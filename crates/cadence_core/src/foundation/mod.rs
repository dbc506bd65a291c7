//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Fixed-timestep time accumulation
//! - Explicit object pools
//! - Logging utilities

pub mod logging;
pub mod pool;
pub mod time;

pub use pool::{Pool, SharedPool};
pub use time::{StepOutput, TimeAccumulator};
