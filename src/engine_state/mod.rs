//! # Engine State Module
//!
//! The core module that owns the streamed world and everything it needs.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `config` - World configuration read from JSON
//! * `rendering` - Geometry tables, meshing, mesh tasks and the render sink
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Blocks, terrain, chunks and the streaming world
//!
//! ## Architecture
//!
//! `EngineState` is the composition root: it builds the block registry's
//! meshing context and the world from configuration once, and afterwards only
//! forwards player positions into the world.

use cgmath::Point3;
use log::{debug, info};

use config::WorldConfig;
use rendering::{meshing::mesher::MeshingContext, sink::RenderSink};
use voxels::{
    block::BlockRegistry,
    world::{StreamError, TickReport, World},
};

pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the engine.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(&config, registry, MeshStatsSink::new())?;
///
/// // Main loop
/// loop {
///     engine_state.update(player_position)?;
/// }
/// ```
pub struct EngineState<S: RenderSink> {
    /// The streamed voxel world
    pub world: World<S>,
    /// Number of updates processed so far
    frame: u64,
    /// Totals over every update
    totals: TickReport,
}

impl<S: RenderSink> EngineState<S> {
    /// Creates a new engine state with all subsystems initialized.
    ///
    /// # Arguments
    ///
    /// * `config` - World configuration
    /// * `registry` - The block registry built from the authoring list
    /// * `sink` - Receiver of finished chunk meshes
    ///
    /// # Returns
    ///
    /// The engine state, or why the world could not be loaded.
    pub fn new(
        config: &WorldConfig,
        registry: BlockRegistry,
        sink: S,
    ) -> Result<Self, StreamError> {
        let context = MeshingContext::from_config(config, registry);
        let world = World::new(config, context, sink)?;

        Ok(Self {
            world,
            frame: 0,
            totals: TickReport::default(),
        })
    }

    /// Advances the world by one frame.
    ///
    /// # Arguments
    ///
    /// * `player_position` - The player's world position this frame
    pub fn update(&mut self, player_position: Point3<f32>) -> Result<TickReport, StreamError> {
        let report = self.world.tick(player_position)?;
        self.frame += 1;

        self.totals.requested += report.requested;
        self.totals.loaded += report.loaded;
        self.totals.unloaded += report.unloaded;
        self.totals.cancelled += report.cancelled;

        if !report.is_empty() {
            debug!("Frame {}: {:?}", self.frame, report);
        }
        Ok(report)
    }

    /// Number of updates processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sums of every report so far.
    pub fn totals(&self) -> TickReport {
        self.totals
    }

    /// Tears the world down and returns the render sink.
    pub fn shutdown(self) -> S {
        info!(
            "Shutting down after {} frames: {} requested, {} loaded, {} unloaded, {} cancelled",
            self.frame,
            self.totals.requested,
            self.totals.loaded,
            self.totals.unloaded,
            self.totals.cancelled
        );
        self.world.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::sink::MeshStatsSink, voxels::terrain::GenerationMethod,
    };

    #[test]
    fn totals_accumulate_across_updates() {
        let config = WorldConfig {
            render_range: 1,
            unload_range: 1,
            worker_count: 1,
            generator: GenerationMethod::Empty,
            ..WorldConfig::default()
        };
        let mut engine_state =
            EngineState::new(&config, BlockRegistry::default(), MeshStatsSink::new()).unwrap();

        engine_state.update(Point3::new(0.0, 0.0, 0.0)).unwrap();
        engine_state.update(Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(engine_state.frame(), 2);
        assert_eq!(engine_state.totals().requested, 9);

        let sink = engine_state.shutdown();
        assert_eq!(sink.resident_chunks(), 0);
    }
}
