//! # Chunk Module
//!
//! A chunk is a 16 wide, 256 high column of the world and the unit of
//! streaming and meshing. Chunks hold no block data: their contents are always
//! re-derived from the terrain classifier. What a chunk owns is its coordinate
//! and, depending on its state, either the handle of its in-flight mesh build
//! or the render resource the finished mesh was turned into.

use std::fmt;

use cgmath::{Point3, Vector3};

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::ChunkMeshOutput,
    task_management::task::TaskHandle,
};

/// The width (x and z) of a chunk in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// The height (y) of a chunk in blocks. Chunks span the whole world height.
pub const CHUNK_HEIGHT: i32 = 256;
/// Largest chunk coordinate, on either axis and in either direction, that is
/// part of the world.
///
/// Every block of such a chunk, and every neighbor it is meshed against, has a
/// world position representable as `i32`.
pub const CHUNK_COORDINATE_LIMIT: i32 = i32::MAX / CHUNK_WIDTH - 1;

/// Position of a chunk in the horizontal chunk grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoordinate {
    /// Grid position along the world x axis
    pub x: i32,
    /// Grid position along the world z axis
    pub z: i32,
}

impl ChunkCoordinate {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoordinate { x, z }
    }

    /// The chunk containing a world-space position.
    ///
    /// Uses floor division so that positions just below zero land in chunk -1.
    /// Positions beyond the edge of the world land in the outermost chunk.
    pub fn from_world_position(position: Point3<f32>) -> Self {
        let axis = |value: f32| {
            (value.floor() as i32)
                .div_euclid(CHUNK_WIDTH)
                .clamp(-CHUNK_COORDINATE_LIMIT, CHUNK_COORDINATE_LIMIT)
        };
        ChunkCoordinate {
            x: axis(position.x),
            z: axis(position.z),
        }
    }

    /// Returns `true` if the chunk lies within the world's horizontal bounds.
    pub fn is_within_world(&self) -> bool {
        self.x.abs() <= CHUNK_COORDINATE_LIMIT && self.z.abs() <= CHUNK_COORDINATE_LIMIT
    }

    /// Offset from chunk-local block positions to world block positions.
    pub fn world_offset(&self) -> Vector3<i32> {
        Vector3::new(self.x * CHUNK_WIDTH, 0, self.z * CHUNK_WIDTH)
    }

    /// Translates a chunk-local block position into a world block position.
    #[inline]
    pub fn to_world(&self, local: Point3<i32>) -> Point3<i32> {
        local + self.world_offset()
    }

    /// Grid distance to another chunk: the larger of the two axis distances.
    pub fn chebyshev_distance(&self, other: &ChunkCoordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Every coordinate within `range` grid steps of `self`, in x-major order.
    ///
    /// Yields a square of side `2 * range + 1`, cut off at the edge of the
    /// world.
    pub fn square_around(self, range: u32) -> impl Iterator<Item = ChunkCoordinate> {
        let limit = i64::from(CHUNK_COORDINATE_LIMIT);
        let span = |center: i32| {
            let center = i64::from(center);
            let low = (center - i64::from(range)).max(-limit);
            let high = (center + i64::from(range)).min(limit);
            // Both ends lie within the limit, so they fit in i32.
            low as i32..=high as i32
        };
        let z_span = span(self.z);
        span(self.x).flat_map(move |x| z_span.clone().map(move |z| ChunkCoordinate::new(x, z)))
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Where a chunk is in its lifecycle.
///
/// A chunk that is not in the world at all is simply absent from the loaded
/// chunk set; there is no `Unloaded` variant.
pub enum ChunkState<R> {
    /// The mesh build was dispatched and has not been collected yet.
    Pending(TaskHandle<ChunkMeshOutput>),
    /// The mesh was handed to the render sink, which returned this resource.
    Loaded(R),
}

/// A materialized chunk, owned by the world's loaded chunk set.
pub struct Chunk<R> {
    /// The position of this chunk in the chunk grid
    pub coordinate: ChunkCoordinate,
    /// Current lifecycle state
    pub state: ChunkState<R>,
}

impl<R> Chunk<R> {
    /// Creates a chunk whose mesh build is in flight.
    pub fn pending(coordinate: ChunkCoordinate, handle: TaskHandle<ChunkMeshOutput>) -> Self {
        Chunk {
            coordinate,
            state: ChunkState::Pending(handle),
        }
    }

    /// Returns `true` once the mesh has been committed to a render resource.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ChunkState::Loaded(_))
    }

    /// The render resource, if the chunk is loaded.
    pub fn resource(&self) -> Option<&R> {
        match &self.state {
            ChunkState::Loaded(resource) => Some(resource),
            ChunkState::Pending(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_positions_floor_into_chunks() {
        let at = |x: f32, z: f32| ChunkCoordinate::from_world_position(Point3::new(x, 64.0, z));
        assert_eq!(at(0.0, 0.0), ChunkCoordinate::new(0, 0));
        assert_eq!(at(15.9, 15.9), ChunkCoordinate::new(0, 0));
        assert_eq!(at(16.0, 31.0), ChunkCoordinate::new(1, 1));
        assert_eq!(at(-0.1, -16.0), ChunkCoordinate::new(-1, -1));
        assert_eq!(at(-16.5, 170.0), ChunkCoordinate::new(-2, 10));
    }

    #[test]
    fn to_world_offsets_horizontal_axes_only() {
        let coordinate = ChunkCoordinate::new(-2, 3);
        assert_eq!(coordinate.to_world(Point3::new(1, 40, 15)), Point3::new(-31, 40, 63));
    }

    #[test]
    fn chebyshev_distance_takes_the_larger_axis() {
        let origin = ChunkCoordinate::new(0, 0);
        assert_eq!(origin.chebyshev_distance(&ChunkCoordinate::new(3, -1)), 3);
        assert_eq!(origin.chebyshev_distance(&ChunkCoordinate::new(-2, 5)), 5);
        assert_eq!(origin.chebyshev_distance(&origin), 0);
    }

    #[test]
    fn square_around_covers_the_full_window() {
        let center = ChunkCoordinate::new(10, -4);
        let square: Vec<_> = center.square_around(2).collect();
        assert_eq!(square.len(), 25);
        assert!(square.iter().all(|c| c.chebyshev_distance(&center) <= 2));
        assert_eq!(square.first(), Some(&ChunkCoordinate::new(8, -6)));
        assert_eq!(square.last(), Some(&ChunkCoordinate::new(12, -2)));

        assert_eq!(center.square_around(0).collect::<Vec<_>>(), vec![center]);
    }

    #[test]
    fn far_positions_clamp_to_the_world_edge() {
        let at = |x: f32, z: f32| ChunkCoordinate::from_world_position(Point3::new(x, 64.0, z));
        let edge = at(3.0e9, -3.0e9);
        assert_eq!(
            edge,
            ChunkCoordinate::new(CHUNK_COORDINATE_LIMIT, -CHUNK_COORDINATE_LIMIT)
        );
        assert!(edge.is_within_world());
        assert!(!ChunkCoordinate::new(i32::MAX / CHUNK_WIDTH, 0).is_within_world());

        // The last block and its outward neighbor still fit.
        let last = edge.to_world(Point3::new(CHUNK_WIDTH - 1, 0, 0));
        assert!(last.x.checked_add(1).is_some());
        let first = edge.to_world(Point3::new(0, 0, 0));
        assert!(first.z.checked_sub(1).is_some());
    }

    #[test]
    fn square_around_stops_at_the_world_edge() {
        let edge = ChunkCoordinate::new(CHUNK_COORDINATE_LIMIT, 0);
        let square: Vec<_> = edge.square_around(2).collect();
        assert_eq!(square.len(), 3 * 5);
        assert!(square.iter().all(ChunkCoordinate::is_within_world));

        let corner = ChunkCoordinate::new(-CHUNK_COORDINATE_LIMIT, CHUNK_COORDINATE_LIMIT);
        assert_eq!(corner.square_around(1).count(), 4);
    }

    #[test]
    fn displays_as_a_pair() {
        assert_eq!(ChunkCoordinate::new(4, -7).to_string(), "[4, -7]");
    }
}
