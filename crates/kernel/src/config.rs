use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::maze::MAX_MAZE_SIZE;

/// Errors from loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("maze size must be in 1..={max}, got {0}", max = MAX_MAZE_SIZE)]
    InvalidSize(usize),
    #[error("fog radius must be finite and non-negative, got {0}")]
    InvalidFogRadius(f32),
    #[error("time limit must be greater than zero")]
    ZeroTimeLimit,
}

/// Round parameters. Missing fields in a config file fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length of the square maze.
    pub size: usize,
    /// Fog radius in cells.
    pub fog_radius: f32,
    /// Round length in milliseconds.
    pub time_limit_ms: u64,
    /// Breadcrumb trail capacity.
    pub trail_capacity: usize,
    /// Pin the first round's seed. `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: 15,
            fog_radius: 4.0,
            time_limit_ms: 30_000,
            trail_capacity: 30,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_MAZE_SIZE).contains(&self.size) {
            return Err(ConfigError::InvalidSize(self.size));
        }
        if !self.fog_radius.is_finite() || self.fog_radius < 0.0 {
            return Err(ConfigError::InvalidFogRadius(self.fog_radius));
        }
        if self.time_limit_ms == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
