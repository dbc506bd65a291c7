//! Core module - engine-level configuration
//!
//! Holds the unified configuration types consumed by the frame loop and the
//! task subsystems. Configuration is validated eagerly at load time.

pub mod config;

pub use config::{ConfigError, LoopConfig};
