//! # World Configuration
//!
//! Settings that shape the streamed world, read from JSON. Every field has a
//! default, so a config file only needs to name what it changes.

use std::{fs, io, path::Path, path::PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::voxels::terrain::{GenerationMethod, TerrainParameters};

/// Default distance, in chunks, within which chunks are loaded.
pub const DEFAULT_RENDER_RANGE: u32 = 16;
/// Default distance, in chunks, beyond which chunks are unloaded.
pub const DEFAULT_UNLOAD_RANGE: u32 = 20;
/// Default number of mesh build workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Chunks would be unloaded while still inside the render range.
    #[error("unload range {unload_range} is smaller than render range {render_range}")]
    UnloadRangeTooSmall {
        /// Configured render range
        render_range: u32,
        /// Configured unload range
        unload_range: u32,
    },

    /// No worker would be available to build meshes.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// The config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that was being read
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reads and deserializes a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Settings of the streamed world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunks within this Chebyshev distance of the player chunk are loaded
    pub render_range: u32,
    /// Chunks beyond this Chebyshev distance of the player chunk are unloaded
    pub unload_range: u32,
    /// Seed of every noise layer
    pub seed: u32,
    /// Number of mesh build worker threads
    pub worker_count: usize,
    /// Which terrain to generate
    pub generator: GenerationMethod,
    /// Tunables of the noise terrain
    pub terrain: TerrainParameters,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            render_range: DEFAULT_RENDER_RANGE,
            unload_range: DEFAULT_UNLOAD_RANGE,
            seed: 0,
            worker_count: DEFAULT_WORKER_COUNT,
            generator: GenerationMethod::Noise,
            terrain: TerrainParameters::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: WorldConfig = load_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the relations between fields.
    ///
    /// The unload range must not be smaller than the render range, otherwise
    /// freshly loaded chunks would be unloaded in the same tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unload_range < self.render_range {
            return Err(ConfigError::UnloadRangeTooSmall {
                render_range: self.render_range,
                unload_range: self.unload_range,
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}
