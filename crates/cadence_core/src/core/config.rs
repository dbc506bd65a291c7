//! # Loop Configuration
//!
//! Configuration for the fixed-timestep frame loop and its task budgets.
//! Values can be loaded from TOML or RON files and are validated eagerly:
//! an invalid configuration aborts startup instead of being silently
//! clamped at runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration for the frame loop, timestep and task scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Fixed simulation timestep in seconds (default: 1/60)
    pub target_timestep_secs: f32,

    /// Cap applied to a single frame's measured delta, in seconds.
    /// Bounds the number of catch-up steps after a pause or stall.
    pub maximum_delta_secs: f32,

    /// Maximum number of frame-spread tasks stepped per frame
    pub max_frame_tasks: usize,

    /// Number of background worker threads for the task executor
    pub task_workers: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_timestep_secs: 1.0 / 60.0,
            maximum_delta_secs: 0.25,
            max_frame_tasks: 32,
            task_workers: 2,
        }
    }
}

impl LoopConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a RON file
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse configuration from a RON string
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all fields, rejecting values the loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_timestep_secs.is_finite() || self.target_timestep_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "target_timestep_secs",
                reason: format!("must be a positive finite number, got {}", self.target_timestep_secs),
            });
        }
        if !self.maximum_delta_secs.is_finite() || self.maximum_delta_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "maximum_delta_secs",
                reason: format!("must be a positive finite number, got {}", self.maximum_delta_secs),
            });
        }
        if self.max_frame_tasks == 0 {
            return Err(ConfigError::Invalid {
                field: "max_frame_tasks",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.task_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "task_workers",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to parse RON content
    #[error("Failed to parse RON config: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// A field holds a value the engine cannot run with
    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoopConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.target_timestep_secs - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_timestep_rejected() {
        let config = LoopConfig {
            target_timestep_secs: 0.0,
            ..LoopConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "target_timestep_secs", .. })
        ));
    }

    #[test]
    fn test_negative_timestep_rejected() {
        let config = LoopConfig {
            target_timestep_secs: -0.016,
            ..LoopConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_frame_tasks_rejected() {
        let config = LoopConfig {
            max_frame_tasks: 0,
            ..LoopConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "max_frame_tasks", .. })
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = LoopConfig {
            task_workers: 0,
            ..LoopConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
            target_timestep_secs = 0.02
            maximum_delta_secs = 0.5
            max_frame_tasks = 16
            task_workers = 4
        "#;
        let config = LoopConfig::from_toml_str(toml_str).expect("valid TOML config");
        assert!((config.target_timestep_secs - 0.02).abs() < f32::EPSILON);
        assert_eq!(config.max_frame_tasks, 16);
        assert_eq!(config.task_workers, 4);
    }

    #[test]
    fn test_toml_invalid_value_rejected() {
        let toml_str = "target_timestep_secs = -1.0";
        assert!(LoopConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_ron_defaults_fill_missing_fields() {
        let config = LoopConfig::from_ron_str("(max_frame_tasks: 8)").expect("valid RON config");
        assert_eq!(config.max_frame_tasks, 8);
        assert_eq!(config.task_workers, LoopConfig::default().task_workers);
    }
}
