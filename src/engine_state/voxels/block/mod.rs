//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, the authoring
//! records blocks are described with, and the registry built from them.

use block_side::BlockSide;
use block_type::BlockType;
use serde::{Deserialize, Serialize};

pub mod block_side;
pub mod block_type;
pub mod registry;

pub use registry::{BlockRegistry, RegistryError};

/// The underlying integer type used to represent block types in memory.
/// This is the id type of the block authoring list.
pub type BlockTypeSize = u8;

/// The block authoring list the binary falls back to when no list is supplied.
pub const DEFAULT_BLOCKS_JSON: &str = include_str!("../../../../assets/blocks.json");

/// A single record of the block authoring list.
///
/// These records are consumed once at startup to build the [`BlockRegistry`].
/// Texture indices point into an external texture array and are not checked
/// against its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    /// The integer id of the block type this record describes
    pub id: BlockTypeSize,
    /// Human readable name, unique within the list
    pub name: String,
    /// Whether the block is solid
    #[serde(default = "default_solid")]
    pub solid: bool,
    /// Texture layer used by the top face
    pub texture_top: u32,
    /// Texture layer used by the four side faces
    pub texture_side: u32,
    /// Texture layer used by the bottom face
    pub texture_bottom: u32,
}

fn default_solid() -> bool {
    true
}

impl BlockData {
    /// Parses an authoring list from its JSON form.
    ///
    /// # Arguments
    /// * `json` - A JSON array of block records
    ///
    /// # Returns
    /// The records in authoring order.
    pub fn list_from_json(json: &str) -> Result<Vec<BlockData>, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The authoring list embedded in the crate.
    pub fn default_list() -> Result<Vec<BlockData>, RegistryError> {
        Self::list_from_json(DEFAULT_BLOCKS_JSON)
    }
}

/// The resolved, immutable description of a block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    /// The block type this definition belongs to
    pub id: BlockType,
    /// Human readable name
    pub name: String,
    /// Texture layer used by the top face
    pub top_texture: u32,
    /// Texture layer used by the four side faces
    pub side_texture: u32,
    /// Texture layer used by the bottom face
    pub bottom_texture: u32,
    /// Whether the block is solid
    pub solid: bool,
}

impl BlockDefinition {
    /// Returns the texture layer for the given face.
    ///
    /// Top faces use `top_texture`, bottom faces `bottom_texture`, and all four
    /// horizontal faces share `side_texture`.
    #[inline]
    pub fn texture_for(&self, side: BlockSide) -> u32 {
        match side {
            BlockSide::TOP => self.top_texture,
            BlockSide::BOTTOM => self.bottom_texture,
            BlockSide::BACK | BlockSide::FRONT | BlockSide::LEFT | BlockSide::RIGHT => {
                self.side_texture
            }
        }
    }
}

impl TryFrom<BlockData> for BlockDefinition {
    type Error = RegistryError;

    fn try_from(data: BlockData) -> Result<Self, Self::Error> {
        let id = BlockType::from_int(data.id).ok_or(RegistryError::UnknownId(data.id))?;
        Ok(BlockDefinition {
            id,
            name: data.name,
            top_texture: data.texture_top,
            side_texture: data.texture_side,
            bottom_texture: data.texture_bottom,
            solid: data.solid,
        })
    }
}
