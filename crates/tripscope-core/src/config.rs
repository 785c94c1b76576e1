//! Playback configuration
//!
//! Stored as JSON. Every field has a default, so partial files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::clock::{DEFAULT_TIME_STEP, MAX_SPEED, MIN_SPEED};
use crate::sampler::MATCH_TOLERANCE;
use crate::violation::DetectorConfig;

/// Errors loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Nearest-sample match window (seconds)
    pub tolerance: f64,
    /// Wall-clock period between ticks (ms)
    pub tick_period_ms: u64,
    /// Trip seconds advanced per tick at 1x
    pub time_step: f64,
    /// Initial playback multiplier
    pub default_speed: f64,
    /// Violation thresholds and log behaviour
    pub detector: DetectorConfig,
    /// Signal value cache
    pub cache: CacheConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tolerance: MATCH_TOLERANCE,
            tick_period_ms: 100,
            time_step: DEFAULT_TIME_STEP,
            default_speed: 1.0,
            detector: DetectorConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: PlaybackConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detector;
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be positive".into()));
        }
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if d.critical_threshold > d.warning_threshold {
            return Err(ConfigError::Invalid(format!(
                "critical threshold {} exceeds warning threshold {}",
                d.critical_threshold, d.warning_threshold
            )));
        }
        if d.log_capacity == 0 {
            return Err(ConfigError::Invalid("detector log_capacity must be positive".into()));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid("cache capacity must be positive".into()));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.default_speed) {
            tracing::warn!(
                "default_speed {} outside {}..={}, it will be clamped",
                self.default_speed,
                MIN_SPEED,
                MAX_SPEED
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::TriggerMode;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{ "detector": { "trigger_mode": "level" } }"#).unwrap();
        assert_eq!(config.detector.trigger_mode, TriggerMode::Level);
        assert_eq!(config.detector.log_capacity, 5);
        assert_eq!(config.tick_period_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = PlaybackConfig::default();
        config.detector.critical_threshold = 2.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = PlaybackConfig {
            time_step: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
