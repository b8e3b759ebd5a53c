//! Output buffers of a chunk mesh build.

use crate::engine_state::rendering::vertex::Vertex;

/// Vertex and index buffers describing the visible surface of one chunk.
///
/// Built as quads: every face adds four vertices and six indices. Owned by the
/// build task until it is handed to the render sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertices, four per quad
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`, six per quad
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the six indices of a quad whose first vertex is `offset`.
    ///
    /// The two triangles are `(0, 1, 2)` and `(2, 1, 3)` relative to the
    /// offset.
    #[inline]
    pub fn generate_face_indices(offset: u32) -> [u32; 6] {
        [
            offset,
            offset + 1,
            offset + 2,
            offset + 2,
            offset + 1,
            offset + 3,
        ]
    }

    /// Appends one quad.
    pub fn push_quad(&mut self, vertices: [Vertex; 4]) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&vertices);
        self.indices.extend_from_slice(&Self::generate_face_indices(offset));
    }

    /// Number of quads in the buffers.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns `true` if the chunk has no visible faces.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Checks the quad structure of the buffers.
    ///
    /// Vertex count must be a multiple of 4, index count six per quad, and
    /// every index must point at an existing vertex.
    pub fn is_well_formed(&self) -> bool {
        let vertex_count = self.vertices.len();
        vertex_count % 4 == 0
            && self.indices.len() == vertex_count / 4 * 6
            && self.indices.iter().all(|&i| (i as usize) < vertex_count)
    }
}
