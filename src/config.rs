//! # Engine Configuration
//!
//! Runtime settings read from a JSON file at startup. Every field has a default, so a missing
//! or partial file still produces a usable configuration.
//!
//! ## Example
//!
//! ```json
//! {
//!   "volume_size": 32,
//!   "strategy": "chunked_mesh",
//!   "population": { "kind": "perlin", "scale": 0.08, "threshold": 0.1, "voxel_type": 2 },
//!   "seed": 7
//! }
//! ```

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::{
    engine_state::voxels::{generation::PopulationPattern, volume::VolumeStrategy},
    error::ConfigError,
};

/// Default file name looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "engine_config.json";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "VOXEL_ENGINE_CONFIG";

/// Top level engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of the octree volume; must be a power of two
    pub volume_size: u32,
    /// Which volume representation to build
    pub strategy: VolumeStrategy,
    /// How the volume is filled at bring-up
    pub population: PopulationPattern,
    /// Seed for the injected random source, `None` seeds from entropy
    pub seed: Option<u64>,
    /// Loaded chunk counts per axis for the chunked strategy; each must be odd
    pub chunk_window: [u32; 3],
    /// Camera tuning
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            volume_size: 64,
            strategy: VolumeStrategy::Octree,
            population: PopulationPattern::default(),
            seed: None,
            chunk_window: [3, 3, 3],
            camera: CameraConfig::default(),
        }
    }
}

/// Camera movement and projection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clip distance
    pub near_clip: f32,
    /// Far clip distance
    pub far_clip: f32,
    /// Translation speed in voxels per second
    pub movement_speed: f32,
    /// Rotation speed in radians per second
    pub turn_speed: f32,
    /// Zoom change per second while a zoom key is held
    pub zoom_speed: f32,
    /// Lower zoom clamp
    pub min_zoom: f32,
    /// Upper zoom clamp
    pub max_zoom: f32,
    /// Initial zoom
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 1.0,
            near_clip: 0.1,
            far_clip: 1000.0,
            movement_speed: 80.0,
            turn_speed: 1.5,
            zoom_speed: 0.2,
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Loads from `$VOXEL_ENGINE_CONFIG` or `engine_config.json`, falling back to defaults.
    pub fn load_or_default() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded engine config from {:?}", path);
                config
            }
            Err(err) => {
                warn!("{}; using default engine config", err);
                Self::default()
            }
        }
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.volume_size.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "volume_size {} is not a power of two",
                self.volume_size
            )));
        }
        if self.chunk_window.iter().any(|&n| n == 0 || n % 2 == 0) {
            return Err(ConfigError::Invalid(format!(
                "chunk_window {:?} must be odd on every axis",
                self.chunk_window
            )));
        }
        if self.camera.min_zoom <= 0.0 || self.camera.min_zoom > self.camera.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] is empty",
                self.camera.min_zoom, self.camera.max_zoom
            )));
        }
        Ok(())
    }

    /// Builds the random source handed to bring-up population.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
