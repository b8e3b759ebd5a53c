//! # Block Side Module
//!
//! This module defines the six faces of a voxel block. The variant order is
//! the row order of the geometry tables, so `side as usize` indexes the
//! direction and face-corner tables directly.

/// Represents the six possible faces of a voxel block.
///
/// The order is: [BACK, FRONT, TOP, BOTTOM, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The back face (facing negative Z)
    BACK = 0,

    /// The front face (facing positive Z)
    FRONT = 1,

    /// The top face (facing positive Y)
    TOP = 2,

    /// The bottom face (facing negative Y)
    BOTTOM = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in table order.
    ///
    /// The mesher walks faces in this order, which fixes the order quads are
    /// emitted for a single block.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::BACK,
            BlockSide::FRONT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Returns `true` for the four faces whose normal lies in the horizontal plane.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, BlockSide::TOP | BlockSide::BOTTOM)
    }
}
