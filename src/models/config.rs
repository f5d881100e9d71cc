use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;
use thiserror::Error;

/// Number of bars generated by default
pub const DEFAULT_ARRAY_LEN: usize = 80;

/// Smallest generated bar height (inclusive)
pub const DEFAULT_MIN_VALUE: u32 = 20;

/// Largest generated bar height (exclusive)
pub const DEFAULT_MAX_VALUE: u32 = 420;

/// Pause between two animated steps
pub const DEFAULT_STEP_DELAY_MS: u64 = 30;

/// Largest `max_value` the chart can draw; bar heights are `int` in the UI
pub const MAX_CHART_VALUE: u32 = i32::MAX as u32;

/// User configuration from `Sorting Visualizer.yaml`
///
/// Every key is optional; missing keys fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub array_len: usize,
    pub min_value: u32,
    pub max_value: u32,
    pub step_delay_ms: u64,
    pub debug_mode: bool,
    pub log_dir: String,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            array_len: DEFAULT_ARRAY_LEN,
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            debug_mode: false,
            log_dir: "logs".to_string(),
        }
    }
}

/// Configuration values that cannot drive a visualization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("array_len must be at least 1")]
    EmptyArray,

    #[error("value range {min}..{max} is empty")]
    EmptyValueRange { min: u32, max: u32 },

    #[error("max_value {max} exceeds the chart limit {limit}")]
    ValueTooLarge { max: u32, limit: u32 },
}

impl VisualizerConfig {
    /// Check the invariants the generator relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.array_len == 0 {
            return Err(ConfigError::EmptyArray);
        }
        if self.min_value >= self.max_value {
            return Err(ConfigError::EmptyValueRange {
                min: self.min_value,
                max: self.max_value,
            });
        }
        if self.max_value > MAX_CHART_VALUE {
            return Err(ConfigError::ValueTooLarge {
                max: self.max_value,
                limit: MAX_CHART_VALUE,
            });
        }
        Ok(())
    }

    /// Half-open range bar heights are drawn from
    pub fn value_range(&self) -> Range<u32> {
        self.min_value..self.max_value
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}
