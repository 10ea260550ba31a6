use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::TimingError;
use crate::core::timing::TimingConfig;

/// Errors from loading a [`ClockConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Timing(#[from] TimingError),
}

/// Configuration for a [`ClockController`](crate::api::clock::ClockController).
/// Built once by the host and handed to the controller by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Tick duration and any carried remainder (default: one tick per unit).
    pub timing: TimingConfig,
    /// Whether the clock starts running (default: true).
    pub running: bool,
    /// Drive from the fixed-rate callback instead of the per-frame one.
    pub use_fixed_update: bool,
    /// Sample wall-clock deltas instead of time-scaled ones.
    pub unscaled_time: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::ONE,
            running: true,
            use_fixed_update: false,
            unscaled_time: false,
        }
    }
}

impl ClockConfig {
    /// Config with the given tick duration and default flags.
    pub fn with_tick_duration(tick_duration: f32) -> Result<Self, TimingError> {
        Ok(Self {
            timing: TimingConfig::new(tick_duration)?,
            ..Self::default()
        })
    }

    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the tick duration the way [`TimingConfig::new`] does.
    pub fn validate(&self) -> Result<(), TimingError> {
        TimingConfig::new(self.timing.tick_duration()).map(|_| ())
    }
}
