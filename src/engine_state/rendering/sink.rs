//! # Render Sink
//!
//! The seam between chunk streaming and whatever draws the chunks. The world
//! hands each finished mesh to the sink exactly once and gets back an opaque
//! resource, which it hands back when the chunk is unloaded.

use log::{debug, info};

use super::meshing::mesh::MeshBuffers;
use crate::engine_state::voxels::chunk::ChunkCoordinate;

/// Receiver of finished chunk meshes.
pub trait RenderSink {
    /// What the sink turns a mesh into, e.g. a pair of GPU buffers.
    type Resource;

    /// Takes ownership of a finished mesh.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk the mesh belongs to; positions are relative
    ///   to its world offset
    /// * `mesh` - The chunk's vertex and index buffers
    fn upload(&mut self, coordinate: ChunkCoordinate, mesh: MeshBuffers) -> Self::Resource;

    /// Frees a resource returned by [`RenderSink::upload`].
    fn release(&mut self, coordinate: ChunkCoordinate, resource: Self::Resource);
}

/// The resource handed out by [`MeshStatsSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshStats {
    /// Vertices in the uploaded mesh
    pub vertex_count: usize,
    /// Indices in the uploaded mesh
    pub index_count: usize,
}

/// A sink that keeps no geometry, only totals of what is resident.
///
/// Used by the headless binary and the streaming tests.
#[derive(Debug, Default)]
pub struct MeshStatsSink {
    resident_chunks: usize,
    resident_vertices: usize,
    resident_indices: usize,
    total_uploads: usize,
}

impl MeshStatsSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks currently holding a resource.
    pub fn resident_chunks(&self) -> usize {
        self.resident_chunks
    }

    /// Vertices across all resident chunks.
    pub fn resident_vertices(&self) -> usize {
        self.resident_vertices
    }

    /// Indices across all resident chunks.
    pub fn resident_indices(&self) -> usize {
        self.resident_indices
    }

    /// Uploads since creation, including released ones.
    pub fn total_uploads(&self) -> usize {
        self.total_uploads
    }

    /// Logs the resident totals.
    pub fn log_summary(&self) {
        info!(
            "Resident: {} chunks, {} vertices, {} indices ({} uploads total)",
            self.resident_chunks, self.resident_vertices, self.resident_indices, self.total_uploads
        );
    }
}

impl RenderSink for MeshStatsSink {
    type Resource = MeshStats;

    fn upload(&mut self, coordinate: ChunkCoordinate, mesh: MeshBuffers) -> MeshStats {
        let stats = MeshStats {
            vertex_count: mesh.vertices.len(),
            index_count: mesh.indices.len(),
        };
        self.resident_chunks += 1;
        self.resident_vertices += stats.vertex_count;
        self.resident_indices += stats.index_count;
        self.total_uploads += 1;
        debug!(
            "Uploaded chunk {}: {} vertices, {} indices",
            coordinate, stats.vertex_count, stats.index_count
        );
        stats
    }

    fn release(&mut self, coordinate: ChunkCoordinate, resource: MeshStats) {
        self.resident_chunks -= 1;
        self.resident_vertices -= resource.vertex_count;
        self.resident_indices -= resource.index_count;
        debug!("Released chunk {}", coordinate);
    }
}
