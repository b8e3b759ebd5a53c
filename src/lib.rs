#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streamer
//!
//! Procedural voxel terrain, meshed and streamed around a moving player.
//!
//! The world is never stored. A terrain classifier answers which block sits at
//! any world position, and chunk meshes are rebuilt from it on worker threads
//! whenever a chunk comes into range.
//!
//! ## Key Modules
//!
//! * `application_state` - The headless frame loop driving a simulated player
//! * `engine_state` - Blocks, terrain, meshing, task management and streaming
//!
//! ## Architecture
//!
//! * Terrain classification is a pure function shared by every worker
//! * Meshing emits one quad per block face that borders air
//! * Streaming keeps a square of chunks around the player loaded
//! * Finished meshes leave the crate through a render sink
//!
//! ## Usage
//!
//! ```bash
//! voxel-streamer [world.json] [blocks.json]
//! ```

use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

use application_state::{load_registry, ApplicationConfig, ApplicationError, ApplicationState};

pub mod application_state;
pub mod engine_state;

pub use engine_state::{
    config::{ConfigError, WorldConfig},
    rendering::{
        ChunkMesher, GeometryTables, MeshBuffers, MeshError, MeshStats, MeshStatsSink,
        MeshingContext, RenderSink, Vertex,
    },
    task_management::{
        task::{Task, TaskHandle, TaskPoll},
        TaskManager,
    },
    voxels::{
        block::{
            block_side::BlockSide, block_type::BlockType, BlockData, BlockDefinition,
            BlockRegistry, RegistryError,
        },
        chunk::{ChunkCoordinate, CHUNK_COORDINATE_LIMIT, CHUNK_HEIGHT, CHUNK_WIDTH},
        terrain::{
            EmptyTerrain, FlatTerrain, GenerationMethod, NoiseTerrain, TerrainClassifier,
            TerrainParameters,
        },
        world::{ChunkStatus, StreamError, TickReport, World},
    },
    EngineState,
};

/// Initializes logging, runs the configured simulation and reports the outcome.
///
/// The first argument names a JSON config file, the second a JSON block
/// authoring list. Both are optional; defaults are used for what is missing.
pub fn run() -> ExitCode {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run_with(args.first().map(Path::new), args.get(1).map(Path::new)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_with(
    config_path: Option<&Path>,
    blocks_path: Option<&Path>,
) -> Result<(), ApplicationError> {
    let config = match config_path {
        Some(path) => {
            info!("Reading configuration from {}", path.display());
            ApplicationConfig::from_json_file(path)?
        }
        None => ApplicationConfig::default(),
    };
    let registry = load_registry(blocks_path)?;
    info!("Loaded {} block definitions", registry.len());

    let mut application = ApplicationState::new(&config, registry)?;
    application.run()?;
    application.finish();
    Ok(())
}
