//! # Application State Management
//!
//! This module drives the engine headlessly. Instead of a window and input
//! events, a simulated player moves at a constant velocity and the frame loop
//! forwards its position to the engine once per tick.

use std::path::Path;
use std::thread;

use cgmath::{Point3, Vector3};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::{Duration, Instant};

use crate::engine_state::{
    config::{load_json, ConfigError, WorldConfig},
    rendering::sink::MeshStatsSink,
    voxels::{
        block::{BlockData, BlockRegistry, RegistryError},
        world::StreamError,
    },
    EngineState,
};

/// Anything that can stop the application.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Configuration could not be read or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The block authoring list could not be turned into a registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The world failed to load or to advance.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// How the simulated player moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of frames to run
    pub ticks: u64,
    /// Target frame duration in milliseconds
    pub tick_millis: u64,
    /// Player velocity in blocks per second
    pub player_velocity: [f32; 3],
    /// Player position on the first frame
    pub player_start: [f32; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            ticks: 240,
            tick_millis: 16,
            player_velocity: [2.0, 0.0, 0.5],
            player_start: [8.0, 180.0, 8.0],
        }
    }
}

/// Everything the binary reads from its config file.
///
/// World settings sit at the top level of the file, next to a `simulation`
/// object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Settings of the streamed world
    #[serde(flatten)]
    pub world: WorldConfig,
    /// Settings of the simulated player
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl ApplicationConfig {
    /// Reads and validates a config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: ApplicationConfig = load_json(path.as_ref())?;
        config.world.validate()?;
        Ok(config)
    }
}

/// Builds the block registry from an authoring list file, or from the
/// embedded list when no file is given.
pub fn load_registry(path: Option<&Path>) -> Result<BlockRegistry, ApplicationError> {
    let data = match path {
        Some(path) => load_json::<Vec<BlockData>>(path)?,
        None => BlockData::default_list()?,
    };
    Ok(BlockRegistry::from_block_data(data)?)
}

/// The running application: the engine plus the simulated player.
pub struct ApplicationState {
    /// The core engine state
    pub engine_state: EngineState<MeshStatsSink>,
    /// How the player moves
    simulation: SimulationConfig,
    /// Where the player is this frame
    player_position: Point3<f32>,
    /// Timestamp of the last frame
    last_wait_time: Instant,
}

impl ApplicationState {
    /// Creates the engine and places the player at its start position.
    pub fn new(
        config: &ApplicationConfig,
        registry: BlockRegistry,
    ) -> Result<Self, ApplicationError> {
        let engine_state = EngineState::new(&config.world, registry, MeshStatsSink::new())?;
        let [x, y, z] = config.simulation.player_start;

        Ok(ApplicationState {
            engine_state,
            simulation: config.simulation.clone(),
            player_position: Point3::new(x, y, z),
            last_wait_time: Instant::now(),
        })
    }

    /// The player position used for the next frame.
    pub fn player_position(&self) -> Point3<f32> {
        self.player_position
    }

    /// Runs one frame: forwards the player position and then moves the player
    /// by one frame's worth of velocity.
    pub fn frame(&mut self) -> Result<(), ApplicationError> {
        self.engine_state.update(self.player_position)?;

        let step = self.simulation.tick_millis as f32 / 1000.0;
        let [vx, vy, vz] = self.simulation.player_velocity;
        self.player_position += Vector3::new(vx, vy, vz) * step;
        Ok(())
    }

    /// Runs every configured frame, pacing them to the target frame duration.
    pub fn run(&mut self) -> Result<(), ApplicationError> {
        let frame_duration = Duration::from_millis(self.simulation.tick_millis);
        let start = Instant::now();

        for _ in 0..self.simulation.ticks {
            self.last_wait_time = Instant::now();
            self.frame()?;

            let elapsed = self.last_wait_time.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        let world = &self.engine_state.world;
        info!(
            "Ran {} frames in {:?}; player in chunk {}, {} loaded, {} pending",
            self.engine_state.frame(),
            start.elapsed(),
            world.player_chunk(),
            world.loaded_count(),
            world.pending_count()
        );
        world.sink().log_summary();
        Ok(())
    }

    /// Tears the engine down and returns the sink.
    pub fn finish(self) -> MeshStatsSink {
        self.engine_state.shutdown()
    }
}
