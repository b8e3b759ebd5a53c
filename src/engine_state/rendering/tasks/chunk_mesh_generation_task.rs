//! Task for generating mesh data for chunks in a background thread.
//!
//! This keeps the coordinating loop responsive while the comparatively
//! expensive per-block classification of a whole chunk runs on a worker.

use std::sync::Arc;

use crate::engine_state::{
    rendering::meshing::{
        mesh::MeshBuffers,
        mesher::{MeshError, MeshingContext},
    },
    task_management::task::Task,
    voxels::chunk::ChunkCoordinate,
};

/// What a chunk mesh build delivers through its handle.
pub type ChunkMeshOutput = Result<MeshBuffers, MeshError>;

/// A task that builds the mesh of one chunk.
///
/// The task owns nothing but the coordinate and a shared reference to the
/// read-only meshing inputs.
pub struct ChunkMeshGenerationTask {
    /// Shared geometry tables, registry and classifier
    context: Arc<MeshingContext>,
    /// The chunk to build
    coordinate: ChunkCoordinate,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `context` - Shared meshing inputs
    /// * `coordinate` - The chunk to build
    pub fn new(context: Arc<MeshingContext>, coordinate: ChunkCoordinate) -> Self {
        ChunkMeshGenerationTask {
            context,
            coordinate,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    type Output = ChunkMeshOutput;

    fn process(&self) -> ChunkMeshOutput {
        self.context.mesher().build(self.coordinate)
    }
}
