//! # World Module
//!
//! This module provides the `World` struct, which streams chunks around the
//! player. It is the only owner of the loaded chunk set and the only place
//! chunks change state.
//!
//! ## Chunk Lifecycle
//!
//! A coordinate is untracked until it comes within the render range of the
//! player chunk. It then becomes `Pending` while a worker builds its mesh, and
//! `Loaded` once the mesh has been handed to the render sink. Beyond the unload
//! range it is dropped again: a loaded chunk gives its resource back to the
//! sink, a pending chunk has its build cancelled and any late result is
//! discarded.
//!
//! Both ranges are Chebyshev distances in the chunk grid, so the loaded area is
//! a square of side `2 * render_range + 1` centered on the player chunk.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - Mesh builds run on the task manager's workers; a tick never blocks on them

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, warn};
use thiserror::Error;

use crate::engine_state::{
    config::{ConfigError, WorldConfig},
    rendering::{
        meshing::mesher::{MeshError, MeshingContext},
        sink::RenderSink,
        tasks::chunk_mesh_generation_task::{ChunkMeshGenerationTask, ChunkMeshOutput},
    },
    task_management::{task::TaskPoll, TaskManager},
    voxels::{
        block::RegistryError,
        chunk::{Chunk, ChunkCoordinate, ChunkState},
    },
};

/// Errors that stop the world from loading or from advancing.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The world config is invalid.
    #[error("invalid world configuration: {0}")]
    Config(#[from] ConfigError),

    /// The block registry does not cover the terrain.
    #[error("block registry does not cover the terrain: {0}")]
    Registry(#[from] RegistryError),

    /// A mesh build finished with an error.
    #[error("mesh build for chunk {coordinate} failed: {source}")]
    Mesh {
        /// The chunk whose build failed
        coordinate: ChunkCoordinate,
        /// Why it failed
        #[source]
        source: MeshError,
    },

    /// A mesh build will never deliver because its worker went away.
    #[error("mesh build for chunk {coordinate} was lost")]
    BuildLost {
        /// The chunk whose build was lost
        coordinate: ChunkCoordinate,
    },
}

/// What a single tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Chunks that entered the render range and had their build dispatched
    pub requested: usize,
    /// Pending chunks whose mesh was handed to the render sink
    pub loaded: usize,
    /// Loaded chunks that left the unload range and were released
    pub unloaded: usize,
    /// Pending chunks that left the unload range and had their build cancelled
    pub cancelled: usize,
}

impl TickReport {
    /// Returns `true` if the tick changed nothing.
    pub fn is_empty(&self) -> bool {
        *self == TickReport::default()
    }
}

/// The observable state of a tracked chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// The mesh build is in flight
    Pending,
    /// The mesh is held by the render sink
    Loaded,
}

/// Streams chunks in and out around the player.
///
/// # Examples
///
/// ```ignore
/// let context = MeshingContext::from_config(&config, registry);
/// let mut world = World::new(&config, context, MeshStatsSink::new())?;
///
/// // Once per frame:
/// let report = world.tick(player_position)?;
/// ```
pub struct World<S: RenderSink> {
    /// The loaded chunk set, keyed by coordinate
    chunks: HashMap<ChunkCoordinate, Chunk<S::Resource>>,
    /// Read-only inputs shared with every mesh build
    context: Arc<MeshingContext>,
    /// Worker pool running the mesh builds
    task_manager: TaskManager,
    /// Where finished meshes go
    sink: S,
    render_range: u32,
    unload_range: u32,
    player_chunk: ChunkCoordinate,
}

impl<S: RenderSink> World<S> {
    /// Creates an empty world.
    ///
    /// Validates the config and checks that the registry defines every block
    /// type the terrain can produce. Either failure prevents the world from
    /// loading at all.
    ///
    /// # Arguments
    /// * `config` - Ranges and worker count
    /// * `context` - Geometry tables, registry and classifier for mesh builds
    /// * `sink` - Receiver of finished meshes
    pub fn new(
        config: &WorldConfig,
        context: MeshingContext,
        sink: S,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        context.check_coverage()?;

        info!(
            "Streaming world: render range {}, unload range {}, {} workers",
            config.render_range, config.unload_range, config.worker_count
        );

        Ok(World {
            chunks: HashMap::new(),
            context: Arc::new(context),
            task_manager: TaskManager::new(config.worker_count),
            sink,
            render_range: config.render_range,
            unload_range: config.unload_range,
            player_chunk: ChunkCoordinate::default(),
        })
    }

    /// Advances streaming by one step.
    ///
    /// Recomputes the player chunk, then requests chunks that entered the
    /// render range, collects finished builds, and drops chunks that left the
    /// unload range, in that order.
    ///
    /// # Arguments
    /// * `player_position` - The player's world position this frame
    ///
    /// # Errors
    /// A failed or lost mesh build aborts the tick. Chunks that finished
    /// successfully in the same tick are still committed.
    pub fn tick(&mut self, player_position: Point3<f32>) -> Result<TickReport, StreamError> {
        self.task_manager.process_completed_tasks();
        self.task_manager.process_queued_tasks();

        let player_chunk = ChunkCoordinate::from_world_position(player_position);
        if player_chunk != self.player_chunk {
            debug!("Player moved to chunk {}", player_chunk);
            self.player_chunk = player_chunk;
        }

        let requested = self.load_scan();
        let loaded = self.poll_pending()?;
        let (unloaded, cancelled) = self.unload_scan();

        Ok(TickReport {
            requested,
            loaded,
            unloaded,
            cancelled,
        })
    }

    /// Requests every untracked coordinate within the render range.
    ///
    /// # Returns
    /// The number of builds dispatched.
    pub fn load_scan(&mut self) -> usize {
        let mut requested = 0;

        for coordinate in self.player_chunk.square_around(self.render_range) {
            if self.chunks.contains_key(&coordinate) {
                continue;
            }
            let task = ChunkMeshGenerationTask::new(self.context.clone(), coordinate);
            let handle = self.task_manager.publish_task(task);
            self.chunks.insert(coordinate, Chunk::pending(coordinate, handle));
            requested += 1;
        }

        if requested > 0 {
            debug!(
                "Requested {} chunks around {} ({} queued)",
                requested,
                self.player_chunk,
                self.task_manager.queued_count()
            );
        }
        requested
    }

    /// Commits every finished build to the render sink.
    ///
    /// Polls all pending chunks without blocking. Finished meshes are uploaded
    /// in coordinate order. Chunks whose build failed are dropped from the set.
    ///
    /// # Returns
    /// The number of chunks that became loaded.
    pub fn poll_pending(&mut self) -> Result<usize, StreamError> {
        let mut finished: Vec<(ChunkCoordinate, ChunkMeshOutput)> = Vec::new();
        let mut lost: Vec<ChunkCoordinate> = Vec::new();

        for (coordinate, chunk) in &self.chunks {
            if let ChunkState::Pending(handle) = &chunk.state {
                match handle.poll() {
                    TaskPoll::Pending => {}
                    TaskPoll::Ready(output) => finished.push((*coordinate, output)),
                    TaskPoll::Lost => lost.push(*coordinate),
                }
            }
        }

        finished.sort_by_key(|(coordinate, _)| *coordinate);
        lost.sort();

        let mut loaded = 0;
        let mut first_error = None;

        for (coordinate, output) in finished {
            match output {
                Ok(mesh) => {
                    let resource = self.sink.upload(coordinate, mesh);
                    if let Some(chunk) = self.chunks.get_mut(&coordinate) {
                        chunk.state = ChunkState::Loaded(resource);
                    }
                    loaded += 1;
                }
                Err(source) => {
                    self.chunks.remove(&coordinate);
                    first_error.get_or_insert(StreamError::Mesh { coordinate, source });
                }
            }
        }

        for coordinate in lost {
            warn!("Mesh build for chunk {} was lost", coordinate);
            self.chunks.remove(&coordinate);
            first_error.get_or_insert(StreamError::BuildLost { coordinate });
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(loaded),
        }
    }

    /// Drops every tracked coordinate beyond the unload range.
    ///
    /// # Returns
    /// `(unloaded, cancelled)`: loaded chunks released to the sink and pending
    /// chunks whose build was cancelled.
    pub fn unload_scan(&mut self) -> (usize, usize) {
        let center = self.player_chunk;
        let range = self.unload_range;

        let mut leaving: Vec<ChunkCoordinate> = self
            .chunks
            .keys()
            .filter(|coordinate| coordinate.chebyshev_distance(&center) > range)
            .copied()
            .collect();
        leaving.sort();

        let mut unloaded = 0;
        let mut cancelled = 0;

        for coordinate in leaving {
            let Some(chunk) = self.chunks.remove(&coordinate) else {
                continue;
            };
            match chunk.state {
                ChunkState::Pending(handle) => {
                    handle.cancel();
                    cancelled += 1;
                }
                ChunkState::Loaded(resource) => {
                    self.sink.release(coordinate, resource);
                    unloaded += 1;
                }
            }
        }

        if unloaded + cancelled > 0 {
            debug!("Unloaded {} chunks and cancelled {} builds", unloaded, cancelled);
        }
        (unloaded, cancelled)
    }

    /// Releases every loaded chunk, cancels every pending build, and returns
    /// the sink.
    pub fn shutdown(mut self) -> S {
        let mut coordinates: Vec<ChunkCoordinate> = self.chunks.keys().copied().collect();
        coordinates.sort();

        for coordinate in coordinates {
            let Some(chunk) = self.chunks.remove(&coordinate) else {
                continue;
            };
            match chunk.state {
                ChunkState::Pending(handle) => handle.cancel(),
                ChunkState::Loaded(resource) => self.sink.release(coordinate, resource),
            }
        }
        self.sink
    }

    /// Returns `true` if the coordinate is pending or loaded.
    pub fn is_tracked(&self, coordinate: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    /// The state of a tracked coordinate, or `None` if it is not tracked.
    pub fn state_of(&self, coordinate: ChunkCoordinate) -> Option<ChunkStatus> {
        self.chunks.get(&coordinate).map(|chunk| {
            if chunk.is_loaded() {
                ChunkStatus::Loaded
            } else {
                ChunkStatus::Pending
            }
        })
    }

    /// Every tracked coordinate, sorted.
    pub fn tracked_coordinates(&self) -> Vec<ChunkCoordinate> {
        let mut coordinates: Vec<_> = self.chunks.keys().copied().collect();
        coordinates.sort();
        coordinates
    }

    /// Number of loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.values().filter(|chunk| chunk.is_loaded()).count()
    }

    /// Number of chunks whose build is in flight.
    pub fn pending_count(&self) -> usize {
        self.chunks.len() - self.loaded_count()
    }

    /// The chunk containing the player as of the last tick.
    pub fn player_chunk(&self) -> ChunkCoordinate {
        self.player_chunk
    }

    /// The render resource of a loaded chunk.
    pub fn resource(&self, coordinate: ChunkCoordinate) -> Option<&S::Resource> {
        self.chunks.get(&coordinate).and_then(Chunk::resource)
    }

    /// The render sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Chunks within this distance of the player chunk are loaded.
    pub fn render_range(&self) -> u32 {
        self.render_range
    }

    /// Chunks beyond this distance of the player chunk are unloaded.
    pub fn unload_range(&self) -> u32 {
        self.unload_range
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::engine_state::{
        rendering::{meshing::geometry::GeometryTables, sink::MeshStatsSink},
        voxels::{
            block::{block_type::BlockType, BlockRegistry},
            terrain::{EmptyTerrain, FlatTerrain},
        },
    };

    fn config(render_range: u32, unload_range: u32) -> WorldConfig {
        WorldConfig {
            render_range,
            unload_range,
            worker_count: 2,
            ..WorldConfig::default()
        }
    }

    fn empty_world(render_range: u32, unload_range: u32) -> World<MeshStatsSink> {
        let context = MeshingContext::new(
            GeometryTables::new(),
            BlockRegistry::default(),
            Box::new(EmptyTerrain),
        );
        World::new(&config(render_range, unload_range), context, MeshStatsSink::new()).unwrap()
    }

    fn settle(world: &mut World<MeshStatsSink>, position: Point3<f32>) {
        let deadline = Instant::now() + Duration::from_secs(30);
        world.tick(position).unwrap();
        while world.pending_count() > 0 {
            assert!(Instant::now() < deadline, "chunks never finished loading");
            thread::sleep(Duration::from_millis(2));
            world.tick(position).unwrap();
        }
    }

    #[test]
    fn first_tick_requests_the_render_square() {
        let mut world = empty_world(1, 2);
        let report = world.tick(Point3::new(8.0, 100.0, 8.0)).unwrap();

        assert_eq!(report.requested, 9);
        assert_eq!(world.tracked_coordinates().len(), 9);
        assert!(world.is_tracked(ChunkCoordinate::new(-1, 1)));
        assert!(!world.is_tracked(ChunkCoordinate::new(2, 0)));
    }

    #[test]
    fn finished_builds_become_loaded() {
        let mut world = empty_world(1, 1);
        settle(&mut world, Point3::new(0.0, 0.0, 0.0));

        assert_eq!(world.loaded_count(), 9);
        assert_eq!(world.state_of(ChunkCoordinate::new(1, 1)), Some(ChunkStatus::Loaded));
        assert_eq!(world.state_of(ChunkCoordinate::new(3, 1)), None);
        assert_eq!(world.sink().resident_chunks(), 9);
        assert_eq!(world.resource(ChunkCoordinate::new(0, 0)).map(|s| s.vertex_count), Some(0));
    }

    #[test]
    fn leaving_chunks_are_released() {
        let mut world = empty_world(1, 1);
        settle(&mut world, Point3::new(0.0, 0.0, 0.0));

        let report = world.tick(Point3::new(40.0, 0.0, 0.0)).unwrap();
        assert_eq!(report.unloaded, 6);
        assert_eq!(world.player_chunk(), ChunkCoordinate::new(2, 0));
        assert!(world.is_tracked(ChunkCoordinate::new(1, -1)));
        assert!(!world.is_tracked(ChunkCoordinate::new(0, 0)));

        let sink = world.shutdown();
        assert_eq!(sink.resident_chunks(), 0);
    }

    #[test]
    fn registry_gaps_prevent_loading() {
        let context = MeshingContext::new(
            GeometryTables::new(),
            BlockRegistry::default(),
            Box::new(FlatTerrain {
                surface_height: 10,
                block: BlockType::STONE,
            }),
        );
        let result = World::new(&config(2, 3), context, MeshStatsSink::new());
        assert!(matches!(
            result,
            Err(StreamError::Registry(RegistryError::MissingDefinition(BlockType::STONE)))
        ));
    }

    #[test]
    fn invalid_config_prevents_loading() {
        let context = MeshingContext::new(
            GeometryTables::new(),
            BlockRegistry::default(),
            Box::new(EmptyTerrain),
        );
        let result = World::new(&config(4, 2), context, MeshStatsSink::new());
        assert!(matches!(
            result,
            Err(StreamError::Config(ConfigError::UnloadRangeTooSmall { .. }))
        ));
    }
}
