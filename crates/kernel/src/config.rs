//! Application configuration, loaded from YAML.
//!
//! Every section and field is optional in the file; missing values take the
//! defaults of the reference scene.

use crate::environment::SceneParams;
use crate::flight::FlightParams;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Liftsim".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Orbit camera setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    /// Keep the plane at the orbit target.
    pub follow_plane: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 1.0,
            far: 1.0e7,
            eye: Vec3::new(0.0, 2600.0, 0.0),
            target: Vec3::ZERO,
            damping: 0.1,
            rotate_speed: 0.5,
            zoom_speed: 0.5,
            enable_pan: true,
            enable_zoom: true,
            enable_rotate: true,
            follow_plane: false,
        }
    }
}

/// Range and starting value of the two pressure sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub pressure_min: f32,
    pub pressure_max: f32,
    pub pressure_step: f32,
    pub initial_above: f32,
    pub initial_below: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            pressure_min: 0.0,
            pressure_max: 2000.0,
            pressure_step: 1.0,
            initial_above: 1000.0,
            initial_below: 1000.0,
        }
    }
}

/// Where the plane model comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// File path or `http(s)://` URL. `builtin` selects the procedural dart.
    pub source: String,
    /// Directory for downloaded models.
    pub cache_dir: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: "scene.gltf".into(),
            cache_dir: PathBuf::from(".liftsim-cache"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub scene: SceneParams,
    pub flight: FlightParams,
    pub model: ModelConfig,
}

impl SimConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.controls;
        if c.pressure_min >= c.pressure_max {
            return Err(ConfigError::Invalid(format!(
                "pressure range is empty: {} >= {}",
                c.pressure_min, c.pressure_max
            )));
        }
        if self.flight.reset_duration <= 0.0 || self.flight.frame_time <= 0.0 {
            return Err(ConfigError::Invalid(
                "frame_time and reset_duration must be positive".into(),
            ));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid(format!(
                "bad camera clip range {}..{}",
                self.camera.near, self.camera.far
            )));
        }
        Ok(())
    }
}
