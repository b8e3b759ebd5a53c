//! Mesh generation for voxel rendering.
//!
//! Converts chunks into face-culled quad meshes.
//!
//! # Architecture
//! - `geometry`: Unit-cube tables describing face directions, corners and UVs
//! - `mesh`: The vertex and index buffers a build produces
//! - `mesher`: The per-chunk build and the shared context it reads from
//!
//! # Performance Considerations
//! - Only solid blocks query their neighbors
//! - Buffers are filled in a single pass without intermediate allocation per block

pub mod geometry;
pub mod mesh;
pub mod mesher;

pub use geometry::GeometryTables;
pub use mesh::MeshBuffers;
pub use mesher::{ChunkMesher, MeshError, MeshingContext};
