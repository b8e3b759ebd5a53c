//! Unit-cube geometry shared by every mesh build.
//!
//! The tables are a plain value built once by whoever composes the system and
//! passed by reference into the mesher. Rows are indexed by [`BlockSide`].

use cgmath::Vector3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Read-only description of a unit cube.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryTables {
    /// Offset to the neighboring block across each face
    pub directions: [Vector3<i32>; 6],
    /// The eight corners of the unit cube
    pub corners: [Vector3<f32>; 8],
    /// For each face, the four corners making up its quad.
    ///
    /// Corner order pairs with [`GeometryTables::uvs`] and with the quad index
    /// pattern `0, 1, 2, 2, 1, 3`, which winds both triangles counter-clockwise
    /// when seen from outside the cube.
    pub face_corners: [[usize; 4]; 6],
    /// UV coordinates of the four quad corners
    pub uvs: [[f32; 2]; 4],
}

impl GeometryTables {
    /// Builds the unit-cube tables.
    pub fn new() -> Self {
        GeometryTables {
            directions: [
                Vector3::new(0, 0, -1), // Back
                Vector3::new(0, 0, 1),  // Front
                Vector3::new(0, 1, 0),  // Top
                Vector3::new(0, -1, 0), // Bottom
                Vector3::new(-1, 0, 0), // Left
                Vector3::new(1, 0, 0),  // Right
            ],
            corners: [
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new(1.0, 0.0, 1.0),
                Vector3::new(1.0, 1.0, 1.0),
                Vector3::new(0.0, 1.0, 1.0),
            ],
            face_corners: [
                [0, 3, 1, 2], // Back
                [5, 6, 4, 7], // Front
                [3, 7, 2, 6], // Top
                [1, 5, 0, 4], // Bottom
                [4, 7, 0, 3], // Left
                [1, 2, 5, 6], // Right
            ],
            uvs: [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
        }
    }

    /// Offset to the neighbor across `side`.
    #[inline]
    pub fn direction(&self, side: BlockSide) -> Vector3<i32> {
        self.directions[side as usize]
    }

    /// The four corner offsets of the quad for `side`, in quad order.
    #[inline]
    pub fn face_vertices(&self, side: BlockSide) -> [Vector3<f32>; 4] {
        self.face_corners[side as usize].map(|corner| self.corners[corner])
    }
}

impl Default for GeometryTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;
    use crate::engine_state::rendering::meshing::mesh::MeshBuffers;

    fn normal_of(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Vector3<f32> {
        (b - a).cross(c - a)
    }

    #[test]
    fn faces_lie_on_their_plane() {
        let tables = GeometryTables::new();
        for side in BlockSide::all() {
            let direction = tables.direction(side).cast::<f32>().unwrap();
            // Positive faces sit at 1 along their axis, negative faces at 0.
            let plane = direction.x.max(0.0) + direction.y.max(0.0) + direction.z.max(0.0);
            for corner in tables.face_vertices(side) {
                let along = corner.dot(direction).abs();
                assert_eq!(along, plane, "{:?} corner {:?}", side, corner);
            }
        }
    }

    #[test]
    fn quads_wind_outward() {
        let tables = GeometryTables::new();
        let indices = MeshBuffers::generate_face_indices(0);
        for side in BlockSide::all() {
            let vertices = tables.face_vertices(side);
            let direction = tables.direction(side).cast::<f32>().unwrap();
            for triangle in indices.chunks(3) {
                let normal = normal_of(
                    vertices[triangle[0] as usize],
                    vertices[triangle[1] as usize],
                    vertices[triangle[2] as usize],
                );
                assert_eq!(normal.normalize(), direction, "{:?}", side);
            }
        }
    }

    #[test]
    fn directions_are_unit_axes() {
        let tables = GeometryTables::new();
        for side in BlockSide::all() {
            let d = tables.direction(side);
            assert_eq!(d.x.abs() + d.y.abs() + d.z.abs(), 1);
            assert_eq!(side.is_horizontal(), d.y == 0);
        }
    }
}
