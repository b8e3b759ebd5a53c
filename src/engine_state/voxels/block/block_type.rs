//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides conversion from the compact integer ids used by the block
//! authoring list.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// The number of `BlockType` variants, including `AIR`.
pub const BLOCK_TYPE_COUNT: usize = 4;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the block id used by the authoring list and by the
/// dense storage inside the block registry. The `FromPrimitive` derive allows
/// conversion from those integer ids.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Empty space. Never meshed and never hides a neighboring face.
    AIR = 0,

    /// The surface block, placed exactly at ground level.
    GRASS = 1,

    /// The subsurface block, a few blocks deep under the grass.
    DIRT = 2,

    /// The deep block that fills everything below the dirt layer.
    STONE = 3,
}

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `None` if the id names no block type.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(btype)
    }

    /// Returns every block type in id order.
    pub fn all() -> [BlockType; BLOCK_TYPE_COUNT] {
        [
            BlockType::AIR,
            BlockType::GRASS,
            BlockType::DIRT,
            BlockType::STONE,
        ]
    }

    /// Returns `true` for empty space.
    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// The slot of this block type in dense per-type tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
