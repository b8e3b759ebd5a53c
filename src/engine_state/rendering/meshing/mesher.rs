//! # Chunk Mesher
//!
//! Turns a chunk coordinate into the visible surface of that chunk. Blocks are
//! never stored: every block of the chunk, and every neighbor of a solid block,
//! is classified on the fly by the terrain classifier. A face is emitted when
//! the neighbor across it is air, which also covers faces on the chunk border
//! because the classifier answers for any world position.

use std::array;

use cgmath::{Point3, Vector3};
use log::debug;
use thiserror::Error;
use web_time::Instant;

use super::{geometry::GeometryTables, mesh::MeshBuffers};
use crate::engine_state::{
    config::WorldConfig,
    rendering::vertex::Vertex,
    voxels::{
        block::{block_side::BlockSide, BlockRegistry, RegistryError},
        chunk::{ChunkCoordinate, CHUNK_HEIGHT, CHUNK_WIDTH},
        terrain::TerrainClassifier,
    },
};

/// Errors raised while building a chunk mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The classifier produced a block type the registry has no definition for.
    #[error("block lookup failed while meshing chunk {coordinate}: {source}")]
    Registry {
        /// The chunk being built
        coordinate: ChunkCoordinate,
        /// The failed lookup
        #[source]
        source: RegistryError,
    },

    /// The chunk lies beyond the edge of the world.
    #[error("chunk {coordinate} lies outside the world")]
    OutOfWorld {
        /// The chunk that was requested
        coordinate: ChunkCoordinate,
    },
}

/// Everything a mesh build reads, shared immutably by all builds.
///
/// Built once at startup and handed to workers behind an `Arc`.
pub struct MeshingContext {
    tables: GeometryTables,
    registry: BlockRegistry,
    terrain: Box<dyn TerrainClassifier>,
}

impl MeshingContext {
    /// Creates a context from its parts.
    pub fn new(
        tables: GeometryTables,
        registry: BlockRegistry,
        terrain: Box<dyn TerrainClassifier>,
    ) -> Self {
        MeshingContext {
            tables,
            registry,
            terrain,
        }
    }

    /// Creates a context whose classifier is the one the config selects.
    pub fn from_config(config: &WorldConfig, registry: BlockRegistry) -> Self {
        let terrain = config.generator.classifier(config.seed, &config.terrain);
        Self::new(GeometryTables::new(), registry, terrain)
    }

    /// Checks that every block type the classifier can produce is registered.
    pub fn check_coverage(&self) -> Result<(), RegistryError> {
        self.registry.require(self.terrain.block_types())
    }

    /// A mesher borrowing this context.
    pub fn mesher(&self) -> ChunkMesher<'_> {
        ChunkMesher {
            tables: &self.tables,
            registry: &self.registry,
            terrain: self.terrain.as_ref(),
        }
    }
}

/// Builds face-culled quad meshes for single chunks.
pub struct ChunkMesher<'a> {
    tables: &'a GeometryTables,
    registry: &'a BlockRegistry,
    terrain: &'a dyn TerrainClassifier,
}

impl<'a> ChunkMesher<'a> {
    /// Creates a mesher over borrowed inputs.
    pub fn new(
        tables: &'a GeometryTables,
        registry: &'a BlockRegistry,
        terrain: &'a dyn TerrainClassifier,
    ) -> Self {
        ChunkMesher {
            tables,
            registry,
            terrain,
        }
    }

    /// Builds the mesh of one chunk.
    ///
    /// Blocks are visited x-major, then z, then y, and each solid block's faces
    /// in [`BlockSide::all`] order, so the output is fully determined by the
    /// coordinate and the classifier.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk to build
    ///
    /// # Returns
    /// Buffers holding one quad per exposed face, with chunk-local positions.
    ///
    /// # Errors
    /// `MeshError::Registry` if a solid block has no definition. The partial
    /// mesh is discarded. `MeshError::OutOfWorld` if the chunk is beyond the
    /// world's horizontal bounds.
    pub fn build(&self, coordinate: ChunkCoordinate) -> Result<MeshBuffers, MeshError> {
        if !coordinate.is_within_world() {
            return Err(MeshError::OutOfWorld { coordinate });
        }
        let start = Instant::now();
        let mut mesh = MeshBuffers::new();

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..CHUNK_HEIGHT {
                    let local = Point3::new(x, y, z);
                    let world = coordinate.to_world(local);

                    let block = self.terrain.block_at(to_f64(world));
                    if block.is_air() {
                        continue;
                    }

                    let definition = self
                        .registry
                        .lookup(block)
                        .map_err(|source| MeshError::Registry { coordinate, source })?;

                    for side in BlockSide::all() {
                        let neighbor = world + self.tables.direction(side);
                        if !self.terrain.block_at(to_f64(neighbor)).is_air() {
                            continue;
                        }
                        mesh.push_quad(self.face(local, side, definition.texture_for(side)));
                    }
                }
            }
        }

        debug!(
            "Meshed chunk {} with {} quads in {:?}",
            coordinate,
            mesh.quad_count(),
            start.elapsed()
        );
        Ok(mesh)
    }

    fn face(&self, local: Point3<i32>, side: BlockSide, texture: u32) -> [Vertex; 4] {
        let origin = Point3::new(local.x as f32, local.y as f32, local.z as f32);
        let corners: [Vector3<f32>; 4] = self.tables.face_vertices(side);
        array::from_fn(|i| Vertex::new(origin + corners[i], texture, self.tables.uvs[i]))
    }
}

#[inline]
fn to_f64(position: Point3<i32>) -> Point3<f64> {
    Point3::new(
        f64::from(position.x),
        f64::from(position.y),
        f64::from(position.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, BlockDefinition},
        chunk::CHUNK_COORDINATE_LIMIT,
        terrain::{FlatTerrain, NoiseTerrain, TerrainParameters},
    };

    fn stone_registry() -> BlockRegistry {
        BlockRegistry::build([BlockDefinition {
            id: BlockType::STONE,
            name: "stone".to_string(),
            top_texture: 7,
            side_texture: 8,
            bottom_texture: 9,
            solid: true,
        }])
        .unwrap()
    }

    /// Solid only at the listed world positions.
    struct Scattered(Vec<Point3<i32>>);

    impl TerrainClassifier for Scattered {
        fn block_at(&self, position: Point3<f64>) -> BlockType {
            let hit = self.0.iter().any(|p| to_f64(*p) == position);
            if hit {
                BlockType::STONE
            } else {
                BlockType::AIR
            }
        }

        fn block_types(&self) -> Vec<BlockType> {
            vec![BlockType::STONE]
        }
    }

    fn texture_of(mesh: &MeshBuffers, quad: usize) -> u32 {
        mesh.vertices[quad * 4].texture_index
    }

    #[test]
    fn flat_world_has_only_top_and_bottom_faces() {
        let tables = GeometryTables::new();
        let registry = stone_registry();
        let terrain = FlatTerrain {
            surface_height: 50,
            block: BlockType::STONE,
        };
        let mesh = ChunkMesher::new(&tables, &registry, &terrain)
            .build(ChunkCoordinate::new(3, -2))
            .unwrap();

        assert!(mesh.is_well_formed());
        assert_eq!(mesh.quad_count(), 512);

        let tops: Vec<_> = (0..mesh.quad_count())
            .filter(|&q| texture_of(&mesh, q) == 7)
            .collect();
        let bottoms = (0..mesh.quad_count())
            .filter(|&q| texture_of(&mesh, q) == 9)
            .count();
        assert_eq!(tops.len(), 256);
        assert_eq!(bottoms, 256);

        for q in tops {
            for vertex in &mesh.vertices[q * 4..q * 4 + 4] {
                assert_eq!(vertex.position[1], 50.0);
            }
        }
    }

    #[test]
    fn isolated_block_emits_six_textured_faces() {
        let tables = GeometryTables::new();
        let registry = stone_registry();
        let terrain = Scattered(vec![Point3::new(4, 20, 9)]);
        let mesh = ChunkMesher::new(&tables, &registry, &terrain)
            .build(ChunkCoordinate::new(0, 0))
            .unwrap();

        assert_eq!(mesh.quad_count(), 6);
        let textures: Vec<u32> = (0..6).map(|q| texture_of(&mesh, q)).collect();
        assert_eq!(textures, [8, 8, 7, 9, 8, 8]);

        // Top face spans the upper square of the block.
        let top: Vec<[f32; 3]> = mesh.vertices[8..12].iter().map(|v| v.position).collect();
        assert_eq!(
            top,
            [
                [4.0, 21.0, 9.0],
                [4.0, 21.0, 10.0],
                [5.0, 21.0, 9.0],
                [5.0, 21.0, 10.0]
            ]
        );
        let uvs: Vec<[f32; 2]> = mesh.vertices[8..12].iter().map(|v| v.tex_coords).collect();
        assert_eq!(uvs, tables.uvs);
    }

    #[test]
    fn faces_between_chunks_are_culled_on_both_sides() {
        let tables = GeometryTables::new();
        let registry = stone_registry();
        let terrain = Scattered(vec![Point3::new(15, 10, 5), Point3::new(16, 10, 5)]);
        let mesher = ChunkMesher::new(&tables, &registry, &terrain);

        let west = mesher.build(ChunkCoordinate::new(0, 0)).unwrap();
        let east = mesher.build(ChunkCoordinate::new(1, 0)).unwrap();
        assert_eq!(west.quad_count(), 5);
        assert_eq!(east.quad_count(), 5);

        // Neither mesh has a face on the shared plane x = 16 (local 16 / local 0).
        let on_seam = |mesh: &MeshBuffers, x: f32| {
            mesh.vertices
                .chunks(4)
                .any(|quad| quad.iter().all(|v| v.position[0] == x))
        };
        assert!(!on_seam(&west, 16.0));
        assert!(!on_seam(&east, 0.0));
    }

    #[test]
    fn noise_chunk_is_well_formed_and_deterministic() {
        let tables = GeometryTables::new();
        let registry =
            BlockRegistry::from_json(crate::engine_state::voxels::block::DEFAULT_BLOCKS_JSON)
                .unwrap();
        let terrain = NoiseTerrain::new(0, TerrainParameters::default());
        let mesher = ChunkMesher::new(&tables, &registry, &terrain);

        let first = mesher.build(ChunkCoordinate::new(-1, 2)).unwrap();
        let second = mesher.build(ChunkCoordinate::new(-1, 2)).unwrap();
        assert!(!first.is_empty());
        assert!(first.is_well_formed());
        assert_eq!(first, second);
    }

    #[test]
    fn noise_seams_between_chunks_complement_each_other() {
        let tables = GeometryTables::new();
        let registry =
            BlockRegistry::from_json(crate::engine_state::voxels::block::DEFAULT_BLOCKS_JSON)
                .unwrap();
        let terrain = NoiseTerrain::new(0, TerrainParameters::default());
        let mesher = ChunkMesher::new(&tables, &registry, &terrain);

        let west = mesher.build(ChunkCoordinate::new(0, 0)).unwrap();
        let east = mesher.build(ChunkCoordinate::new(1, 0)).unwrap();

        // Cells (y, z) of quads lying flat on the local plane `x`.
        let seam_cells = |mesh: &MeshBuffers, x: f32| -> Vec<(i32, i32)> {
            let mut cells: Vec<_> = mesh
                .vertices
                .chunks(4)
                .filter(|quad| quad.iter().all(|v| v.position[0] == x))
                .map(|quad| {
                    let y = quad.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
                    let z = quad.iter().map(|v| v.position[2]).fold(f32::MAX, f32::min);
                    (y as i32, z as i32)
                })
                .collect();
            cells.sort();
            cells
        };
        let west_cells = seam_cells(&west, 16.0);
        let east_cells = seam_cells(&east, 0.0);

        let solid = |x: i32, y: i32, z: i32| {
            !terrain
                .block_at(Point3::new(f64::from(x), f64::from(y), f64::from(z)))
                .is_air()
        };
        let mut expected_west = Vec::new();
        let mut expected_east = Vec::new();
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_WIDTH {
                match (solid(15, y, z), solid(16, y, z)) {
                    (true, false) => expected_west.push((y, z)),
                    (false, true) => expected_east.push((y, z)),
                    _ => {}
                }
            }
        }
        expected_west.sort();
        expected_east.sort();

        assert!(!west_cells.is_empty() || !east_cells.is_empty());
        assert_eq!(west_cells, expected_west);
        assert_eq!(east_cells, expected_east);
        assert!(west_cells.iter().all(|cell| !east_cells.contains(cell)));
    }

    #[test]
    fn chunks_at_the_world_edge_mesh_without_overflow() {
        let tables = GeometryTables::new();
        let registry = stone_registry();
        let terrain = FlatTerrain {
            surface_height: 2,
            block: BlockType::STONE,
        };
        let mesher = ChunkMesher::new(&tables, &registry, &terrain);

        let edge = ChunkCoordinate::new(CHUNK_COORDINATE_LIMIT, -CHUNK_COORDINATE_LIMIT);
        let mesh = mesher.build(edge).unwrap();
        assert_eq!(mesh.quad_count(), 512);

        let beyond = ChunkCoordinate::new(i32::MAX / CHUNK_WIDTH, 0);
        assert!(matches!(
            mesher.build(beyond),
            Err(MeshError::OutOfWorld { coordinate }) if coordinate == beyond
        ));
    }

    #[test]
    fn missing_definition_aborts_the_build() {
        let tables = GeometryTables::new();
        let registry = stone_registry();
        let terrain = FlatTerrain {
            surface_height: 3,
            block: BlockType::DIRT,
        };
        let result =
            ChunkMesher::new(&tables, &registry, &terrain).build(ChunkCoordinate::new(2, 2));
        assert!(matches!(
            result,
            Err(MeshError::Registry {
                coordinate: ChunkCoordinate { x: 2, z: 2 },
                source: RegistryError::MissingDefinition(BlockType::DIRT),
            })
        ));
    }
}
