//! Card stack configuration schema.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CardError, CardResult};
use crate::panel::HeightBounds;

/// Largest accepted `initial_count` and `batch_size`.
pub const MAX_BATCH: u32 = 10_000;

/// Top-level card stack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardStackConfig {
    /// Number of panels created at startup.
    pub initial_count: u32,
    /// Number of panels appended per growth trigger.
    pub batch_size: u32,
    /// Title of the first initial panel.
    pub first_title: String,
    /// Title of the last initial panel.
    pub last_title: String,
    /// Height bounds and default.
    pub height: HeightConfig,
    /// Observer thresholds.
    pub observers: ObserverConfig,
    /// Drag-resize behaviour.
    pub drag: DragConfig,
    /// Title editing behaviour.
    pub edit: EditConfig,
}

impl Default for CardStackConfig {
    fn default() -> Self {
        Self {
            initial_count: 15,
            batch_size: 10,
            first_title: "First Card".into(),
            last_title: "Last Card".into(),
            height: HeightConfig::default(),
            observers: ObserverConfig::default(),
            drag: DragConfig::default(),
            edit: EditConfig::default(),
        }
    }
}

impl CardStackConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> CardResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| CardError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> CardResult<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Height bounds derived from `height`.
    pub fn bounds(&self) -> HeightBounds {
        HeightBounds::new(self.height.min, self.height.max)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> CardResult<()> {
        for (name, value) in [
            ("initial_count", self.initial_count),
            ("batch_size", self.batch_size),
        ] {
            if !(1..=MAX_BATCH).contains(&value) {
                return Err(CardError::ConfigError(format!(
                    "{name} {value} must be between 1 and {MAX_BATCH}"
                )));
            }
        }

        let HeightConfig { min, max, default } = self.height;
        if !(min.is_finite() && max.is_finite() && default.is_finite()) {
            return Err(CardError::ConfigError("height values must be finite".into()));
        }
        if min > max {
            return Err(CardError::ConfigError(format!(
                "height.min {min} exceeds height.max {max}"
            )));
        }
        if default < min || default > max {
            return Err(CardError::ConfigError(format!(
                "height.default {default} outside [{min}, {max}]"
            )));
        }

        for (name, value) in [
            ("visibility_threshold", self.observers.visibility_threshold),
            ("growth_threshold", self.observers.growth_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CardError::ConfigError(format!("{name} {value} outside [0, 1]")));
            }
        }

        let organic = self.observers.organic_height_threshold;
        if !organic.is_finite() || organic < 0.0 {
            return Err(CardError::ConfigError(format!(
                "organic_height_threshold {organic} must be finite and non-negative"
            )));
        }

        Ok(())
    }
}

/// Panel height limits in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightConfig {
    /// Smallest storable height.
    pub min: f32,
    /// Largest storable height.
    pub max: f32,
    /// Height of newly synthesized panels.
    pub default: f32,
}

impl Default for HeightConfig {
    fn default() -> Self {
        Self { min: 100.0, max: 500.0, default: 200.0 }
    }
}

/// Thresholds for the host-driven observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Fraction of a panel inside the viewport for it to count as visible.
    pub visibility_threshold: f32,
    /// Fraction of the last panel inside the viewport that triggers growth.
    pub growth_threshold: f32,
    /// Observed heights at or below this are treated as resting size.
    pub organic_height_threshold: f32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self { visibility_threshold: 0.5, growth_threshold: 0.1, organic_height_threshold: 150.0 }
    }
}

/// Drag-resize configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Minimum interval between committed writes while dragging.
    pub throttle_ms: u64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self { throttle_ms: 200 }
    }
}

/// Title edit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Restore the pre-edit title when an edit is cancelled.
    pub revert_on_cancel: bool,
}
