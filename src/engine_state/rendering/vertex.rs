//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format handed to the render sink.

use cgmath::Point3;

/// A vertex of a chunk mesh.
///
/// Positions are chunk-local; the render sink places the chunk in the world
/// using its coordinate.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Index: u32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// Layer of the texture array this face samples
    pub texture_index: u32,
    /// UV texture coordinates (0.0 or 1.0 at quad corners)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - Chunk-local position
    /// * `texture_index` - Layer of the texture array
    /// * `uv` - Texture coordinates of this quad corner
    pub fn new(pos: Point3<f32>, texture_index: u32, uv: [f32; 2]) -> Self {
        Vertex {
            position: [pos.x, pos.y, pos.z],
            texture_index,
            tex_coords: uv,
        }
    }
}
