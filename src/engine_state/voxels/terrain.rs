//! # Terrain Module
//!
//! Terrain is never stored. Every block of the world is recomputed on demand by
//! a [`TerrainClassifier`], a pure function from an absolute world position to
//! a block type. Because the answer depends only on the absolute position, a
//! chunk checking a neighbor that lies in the next chunk gets the same answer
//! that chunk computes for itself, which keeps seams between chunks closed.
//!
//! ## Generation Methods
//!
//! - `noise`: layered simplex noise with grass, dirt, stone and carved caves
//! - `flat`: a single block type filling everything below a fixed height
//! - `empty`: air everywhere

use cgmath::Point3;
use noise::{NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

use super::block::block_type::BlockType;

/// Lowest y coordinate that can hold a block.
pub const WORLD_FLOOR: f64 = 0.0;
/// Highest y coordinate that can hold a block.
pub const WORLD_CEILING: f64 = 255.0;

/// A pure mapping from world position to block type.
///
/// Implementations must be deterministic and side-effect free: mesh builds for
/// different chunks call them concurrently from worker threads.
pub trait TerrainClassifier: Send + Sync {
    /// Classifies the block occupying the given world position.
    fn block_at(&self, position: Point3<f64>) -> BlockType;

    /// The non-air block types this classifier can return.
    ///
    /// Used at startup to check that the block registry covers the terrain.
    fn block_types(&self) -> Vec<BlockType>;
}

#[inline]
fn outside_world(y: f64) -> bool {
    y < WORLD_FLOOR || y > WORLD_CEILING
}

/// Linearly maps `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
///
/// The result is not clamped.
#[inline]
pub fn remap(from_min: f64, from_max: f64, to_min: f64, to_max: f64, value: f64) -> f64 {
    to_min + (value - from_min) * (to_max - to_min) / (from_max - from_min)
}

/// Tunables of the noise terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParameters {
    /// Frequency of the first ground octave
    pub ground_primary_frequency: f64,
    /// Frequency of the second ground octave
    pub ground_secondary_frequency: f64,
    /// Ground level produced by a combined noise value of 0
    pub ground_min: f64,
    /// Ground level produced by a combined noise value of 1
    pub ground_max: f64,
    /// Frequency of the dirt depth noise
    pub dirt_frequency: f64,
    /// Horizontal offset applied before sampling the dirt depth noise
    pub dirt_offset: f64,
    /// Dirt depth produced by a noise value of -1
    pub dirt_min: f64,
    /// Dirt depth produced by a noise value of 1
    pub dirt_max: f64,
    /// Frequency of the 3-D cave noise
    pub cave_frequency: f64,
    /// Cave noise above this value carves air
    pub cave_threshold: f64,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        TerrainParameters {
            ground_primary_frequency: 0.005,
            ground_secondary_frequency: 0.001,
            ground_min: 100.0,
            ground_max: 200.0,
            dirt_frequency: 0.01,
            dirt_offset: 0.1,
            dirt_min: 1.0,
            dirt_max: 5.0,
            cave_frequency: 0.0035,
            cave_threshold: 0.7,
        }
    }
}

/// Terrain built from layered simplex noise.
///
/// Each noise layer has its own seed derived from the world seed, so changing
/// the seed changes every layer at once.
pub struct NoiseTerrain {
    ground_primary: Simplex,
    ground_secondary: Simplex,
    dirt: Simplex,
    cave: Simplex,
    parameters: TerrainParameters,
}

impl NoiseTerrain {
    /// Creates a noise terrain for the given seed.
    pub fn new(seed: u32, parameters: TerrainParameters) -> Self {
        NoiseTerrain {
            ground_primary: Simplex::new(seed),
            ground_secondary: Simplex::new(seed.wrapping_add(1)),
            dirt: Simplex::new(seed.wrapping_add(2)),
            cave: Simplex::new(seed.wrapping_add(3)),
            parameters,
        }
    }

    /// The y coordinate of the surface block in the column at `(x, z)`.
    ///
    /// Two octaves are multiplied and the product is remapped from `[0, 1]`
    /// onto the ground band, then truncated.
    pub fn ground_level(&self, x: f64, z: f64) -> i32 {
        let p = &self.parameters;
        let primary = self.ground_primary.get([
            x * p.ground_primary_frequency,
            z * p.ground_primary_frequency,
        ]);
        let secondary = self.ground_secondary.get([
            x * p.ground_secondary_frequency,
            z * p.ground_secondary_frequency,
        ]);
        remap(0.0, 1.0, p.ground_min, p.ground_max, primary * secondary) as i32
    }

    /// How many blocks of dirt sit under the grass in the column at `(x, z)`.
    pub fn dirt_depth(&self, x: f64, z: f64) -> i32 {
        let p = &self.parameters;
        let sample = self.dirt.get([
            (x + p.dirt_offset) * p.dirt_frequency,
            (z + p.dirt_offset) * p.dirt_frequency,
        ]);
        remap(-1.0, 1.0, p.dirt_min, p.dirt_max, sample) as i32
    }

    /// Returns `true` where the cave noise carves through solid ground.
    pub fn is_cave(&self, position: Point3<f64>) -> bool {
        let f = self.parameters.cave_frequency;
        self.cave.get([position.x * f, position.y * f, position.z * f])
            > self.parameters.cave_threshold
    }
}

impl TerrainClassifier for NoiseTerrain {
    fn block_at(&self, position: Point3<f64>) -> BlockType {
        if outside_world(position.y) {
            return BlockType::AIR;
        }

        let ground = self.ground_level(position.x, position.z);
        let dirt = self.dirt_depth(position.x, position.z);

        if position.y > f64::from(ground) {
            return BlockType::AIR;
        }

        // Caves win over every solid layer below the surface.
        if self.is_cave(position) {
            return BlockType::AIR;
        }

        if position.y == f64::from(ground) {
            BlockType::GRASS
        } else if position.y >= f64::from(ground - dirt) {
            BlockType::DIRT
        } else {
            BlockType::STONE
        }
    }

    fn block_types(&self) -> Vec<BlockType> {
        vec![BlockType::GRASS, BlockType::DIRT, BlockType::STONE]
    }
}

/// A single block type filling every position with `y < surface_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatTerrain {
    /// First y coordinate that is air
    pub surface_height: i32,
    /// Block placed below the surface
    pub block: BlockType,
}

impl TerrainClassifier for FlatTerrain {
    fn block_at(&self, position: Point3<f64>) -> BlockType {
        if outside_world(position.y) || position.y >= f64::from(self.surface_height) {
            BlockType::AIR
        } else {
            self.block
        }
    }

    fn block_types(&self) -> Vec<BlockType> {
        if self.block.is_air() {
            Vec::new()
        } else {
            vec![self.block]
        }
    }
}

/// Air everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTerrain;

impl TerrainClassifier for EmptyTerrain {
    fn block_at(&self, _position: Point3<f64>) -> BlockType {
        BlockType::AIR
    }

    fn block_types(&self) -> Vec<BlockType> {
        Vec::new()
    }
}

/// The method used to generate the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum GenerationMethod {
    /// Layered simplex noise, see [`NoiseTerrain`]
    Noise,
    /// A flat slab, see [`FlatTerrain`]
    Flat {
        /// First y coordinate that is air
        surface_height: i32,
        /// Block placed below the surface
        block: BlockType,
    },
    /// Air everywhere
    Empty,
}

impl GenerationMethod {
    /// Builds the classifier this method describes.
    pub fn classifier(
        &self,
        seed: u32,
        parameters: &TerrainParameters,
    ) -> Box<dyn TerrainClassifier> {
        match self {
            GenerationMethod::Noise => Box::new(NoiseTerrain::new(seed, parameters.clone())),
            GenerationMethod::Flat {
                surface_height,
                block,
            } => Box::new(FlatTerrain {
                surface_height: *surface_height,
                block: *block,
            }),
            GenerationMethod::Empty => Box::new(EmptyTerrain),
        }
    }
}
