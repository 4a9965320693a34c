//! Start-up configuration: world size, zoom bounds, history depth and the tool kit.

use std::fs;
use std::path::{Path, PathBuf};

use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::{MAX_ZOOM, MIN_ZOOM};
use crate::history::MAX_HISTORY_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing keys take their default values
pub struct CanvasConfig {
    pub world_width: u32,
    pub world_height: u32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub max_history: usize,
    /// JSON kit manifest; the built-in kit is used when unset.
    pub kit: Option<PathBuf>,
    /// Show the open-project dialog right after start-up.
    pub open_on_start: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            world_width: 8000,
            world_height: 6000,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            max_history: MAX_HISTORY_SIZE,
            kit: None,
            open_on_start: false,
        }
    }
}

impl CanvasConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Like [`CanvasConfig::load`], but never fails: problems are logged and the
    /// defaults are used instead.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default config");
                Self::default()
            }
        }
    }

    pub fn world_size(&self) -> Vec2 {
        vec2(self.world_width as f32, self.world_height as f32)
    }

    /// Repair values that would break the camera or history invariants.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.world_width == 0 || self.world_height == 0 {
            log::warn!("World size must be positive; using {}x{}", defaults.world_width, defaults.world_height);
            self.world_width = defaults.world_width;
            self.world_height = defaults.world_height;
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            log::warn!("Invalid zoom bounds {}..{}; using defaults", self.min_zoom, self.max_zoom);
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        }
        self.max_history = self.max_history.max(1);
        self
    }
}
