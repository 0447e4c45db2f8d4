//! Tunable thresholds for gestures and the camera.

use crate::camera::{Camera, MAX_ZOOM, MIN_ZOOM};
use crate::selection::{HANDLE_HIT_SIZE, HANDLE_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Gesture recognition thresholds, in screen pixels and milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Per-axis movement a pan needs before it activates.
    pub pan_slop: f64,
    /// Per-axis movement after which a tap fails.
    pub tap_slop: f64,
    /// Hold time before a long-press fires.
    pub long_press_ms: u64,
    /// Maximum distance a long-press may drift.
    pub long_press_max_distance: f64,
    /// Side of the square handle hit box.
    pub handle_hit_size: f64,
    /// Side of the visible handle square.
    pub handle_size: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pan_slop: 8.0,
            tap_slop: 8.0,
            long_press_ms: 280,
            long_press_max_distance: 12.0,
            handle_hit_size: HANDLE_HIT_SIZE,
            handle_size: HANDLE_SIZE,
        }
    }
}

/// Zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl CameraConfig {
    /// Identity camera with these limits.
    pub fn camera(&self) -> Camera {
        Camera::with_limits(self.min_zoom, self.max_zoom)
    }
}

/// Top-level board configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub gestures: GestureConfig,
    pub camera: CameraConfig,
}

impl BoardConfig {
    /// Parse and validate a configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gestures;
        for (name, value) in [
            ("pan_slop", g.pan_slop),
            ("tap_slop", g.tap_slop),
            ("long_press_max_distance", g.long_press_max_distance),
            ("handle_size", g.handle_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be a non-negative number")));
            }
        }
        if !g.handle_hit_size.is_finite() || g.handle_hit_size < g.handle_size {
            return Err(ConfigError::Invalid(
                "handle_hit_size must be at least handle_size".to_string(),
            ));
        }
        let c = &self.camera;
        if !(c.min_zoom.is_finite() && c.min_zoom > 0.0) {
            return Err(ConfigError::Invalid("min_zoom must be positive".to_string()));
        }
        if !c.max_zoom.is_finite() || c.min_zoom > c.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty",
                c.min_zoom, c.max_zoom
            )));
        }
        Ok(())
    }
}
