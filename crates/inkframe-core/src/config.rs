//! Editor configuration.

use crate::camera::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors reading an editor configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of an editor session. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo states to keep.
    pub history_capacity: usize,
    /// Quiescence before a pending scene is saved, in milliseconds.
    pub autosave_debounce_ms: u64,
    /// Extra hit-test slack in scene units.
    pub hit_tolerance: f64,
    /// Ramer-Douglas-Peucker tolerance for captured strokes (0 disables).
    pub stroke_simplify_tolerance: f64,
    /// Record an undo snapshot when a shape drag starts.
    pub snapshot_shape_creation: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            autosave_debounce_ms: 1000,
            hit_tolerance: 2.0,
            stroke_simplify_tolerance: 0.4,
            snapshot_shape_creation: false,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Config for tests: short debounce.
    pub fn for_testing() -> Self {
        Self {
            autosave_debounce_ms: 100,
            ..Self::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
