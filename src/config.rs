use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{camera::CameraSettings, error::ConfigError};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "glflycam".into(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/lit.vert"),
            fragment: PathBuf::from("shaders/lit.frag"),
        }
    }
}

/// Everything the demo reads from its YAML config. Missing keys fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub shaders: ShaderPaths,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.min_zoom > 0.0 && camera.max_zoom.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "camera zoom range must be positive and finite, got {}..{}",
                camera.min_zoom, camera.max_zoom
            )));
        }
        // negated so a NaN bound fails too
        if !(camera.min_zoom <= camera.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "camera.min_zoom ({}) is larger than camera.max_zoom ({})",
                camera.min_zoom, camera.max_zoom
            )));
        }
        for (name, value) in [
            ("yaw", camera.yaw),
            ("pitch", camera.pitch),
            ("zoom", camera.zoom),
            ("speed", camera.speed),
            ("sensitivity", camera.sensitivity),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "camera.{name} must be a finite number, got {value}"
                )));
            }
        }
        if !(camera.pitch_limit > 0.0 && camera.pitch_limit < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.pitch_limit must be within (0, 90) degrees, got {}",
                camera.pitch_limit
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        Ok(())
    }
}
