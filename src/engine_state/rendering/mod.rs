//! Rendering side of the voxel streamer.
//!
//! This module turns chunks into renderable geometry: the vertex format, the
//! geometry tables and mesher, the background task that runs the mesher, and
//! the sink through which finished meshes leave the crate. Drawing itself
//! happens behind [`RenderSink`].

pub mod meshing;
pub mod sink;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMesher, GeometryTables, MeshBuffers, MeshError, MeshingContext};
pub use sink::{MeshStats, MeshStatsSink, RenderSink};
pub use vertex::Vertex;
