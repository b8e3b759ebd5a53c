//! # Block Registry
//!
//! The registry maps every block type to its [`BlockDefinition`]. It is built
//! once from the authoring list and then only read, so it can be shared by any
//! number of concurrent mesh builds without locking.
//!
//! Storage is a dense array indexed by the block id, which keeps `lookup` a
//! single bounds-checked load. The mesher calls it once per solid block.

use std::collections::HashMap;

use thiserror::Error;

use super::{
    block_type::{BlockType, BLOCK_TYPE_COUNT},
    BlockData, BlockDefinition, BlockTypeSize,
};

/// Errors raised while building or querying the block registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two definitions in the authoring list share an id.
    #[error("duplicate block id {0:?} in block definitions")]
    DuplicateId(BlockType),

    /// Two definitions in the authoring list share a name.
    #[error("duplicate block name `{0}` in block definitions")]
    DuplicateName(String),

    /// An authoring record uses an integer id no block type has.
    #[error("block id {0} does not name a known block type")]
    UnknownId(BlockTypeSize),

    /// A block type was looked up that has no definition.
    #[error("no block definition registered for {0:?}")]
    MissingDefinition(BlockType),

    /// A block name was looked up that has no definition.
    #[error("no block definition named `{0}`")]
    UnknownName(String),

    /// The authoring list could not be parsed.
    #[error("failed to parse block definitions: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable mapping from block type to its definition.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    definitions: [Option<BlockDefinition>; BLOCK_TYPE_COUNT],
    names: HashMap<String, BlockType>,
}

impl BlockRegistry {
    /// Builds a registry from an ordered list of definitions.
    ///
    /// Duplicate ids and duplicate names are rejected with an error rather than
    /// resolved by precedence; the mesher relies on every lookup being
    /// unambiguous.
    ///
    /// # Arguments
    /// * `definitions` - The definitions in authoring order
    ///
    /// # Returns
    /// The registry, or the first integrity error found.
    pub fn build<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = BlockDefinition>,
    {
        let mut registry = BlockRegistry::default();

        for definition in definitions {
            let slot = &mut registry.definitions[definition.id.index()];
            if slot.is_some() {
                return Err(RegistryError::DuplicateId(definition.id));
            }
            if registry.names.contains_key(&definition.name) {
                return Err(RegistryError::DuplicateName(definition.name));
            }
            registry.names.insert(definition.name.clone(), definition.id);
            *slot = Some(definition);
        }

        log::debug!("Built block registry with {} definitions", registry.len());
        Ok(registry)
    }

    /// Builds a registry from raw authoring records.
    pub fn from_block_data(data: Vec<BlockData>) -> Result<Self, RegistryError> {
        let definitions = data
            .into_iter()
            .map(BlockDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(definitions)
    }

    /// Parses a JSON authoring list and builds a registry from it.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Self::from_block_data(BlockData::list_from_json(json)?)
    }

    /// Looks up the definition of a block type.
    ///
    /// # Errors
    /// `RegistryError::MissingDefinition` if the type was never registered.
    /// This means the terrain classifier and the registry are out of sync.
    #[inline]
    pub fn lookup(&self, id: BlockType) -> Result<&BlockDefinition, RegistryError> {
        self.definitions[id.index()]
            .as_ref()
            .ok_or(RegistryError::MissingDefinition(id))
    }

    /// Looks up a definition by its authored name.
    pub fn lookup_by_name(&self, name: &str) -> Result<&BlockDefinition, RegistryError> {
        let id = self
            .names
            .get(name)
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))?;
        self.lookup(*id)
    }

    /// Checks that every given block type has a definition.
    ///
    /// Called at startup with the block types the terrain classifier can emit.
    pub fn require<I>(&self, types: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = BlockType>,
    {
        for block_type in types {
            self.lookup(block_type)?;
        }
        Ok(())
    }

    /// Returns `true` if the block type has a definition.
    pub fn contains(&self, id: BlockType) -> bool {
        self.definitions[id.index()].is_some()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.iter().filter(|d| d.is_some()).count()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: BlockType, name: &str, texture: u32) -> BlockDefinition {
        BlockDefinition {
            id,
            name: name.to_string(),
            top_texture: texture,
            side_texture: texture,
            bottom_texture: texture,
            solid: true,
        }
    }

    #[test]
    fn lookup_returns_registered_definitions() {
        let registry = BlockRegistry::build([
            definition(BlockType::GRASS, "grass", 0),
            definition(BlockType::STONE, "stone", 3),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(BlockType::STONE).unwrap().top_texture, 3);
        assert_eq!(registry.lookup_by_name("grass").unwrap().id, BlockType::GRASS);
    }

    #[test]
    fn duplicate_id_is_a_build_error() {
        let result = BlockRegistry::build([
            definition(BlockType::DIRT, "dirt", 2),
            definition(BlockType::DIRT, "mud", 5),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateId(BlockType::DIRT))));
    }

    #[test]
    fn duplicate_name_is_a_build_error() {
        let result = BlockRegistry::build([
            definition(BlockType::DIRT, "dirt", 2),
            definition(BlockType::STONE, "dirt", 3),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "dirt"));
    }

    #[test]
    fn missing_definition_fails_loudly() {
        let registry = BlockRegistry::build([definition(BlockType::GRASS, "grass", 0)]).unwrap();
        assert!(matches!(
            registry.lookup(BlockType::STONE),
            Err(RegistryError::MissingDefinition(BlockType::STONE))
        ));
        assert!(matches!(
            registry.lookup_by_name("stone"),
            Err(RegistryError::UnknownName(_))
        ));
    }

    #[test]
    fn require_reports_the_first_gap() {
        let registry = BlockRegistry::build([
            definition(BlockType::GRASS, "grass", 0),
            definition(BlockType::DIRT, "dirt", 2),
        ])
        .unwrap();

        assert!(registry.require([BlockType::GRASS, BlockType::DIRT]).is_ok());
        assert!(matches!(
            registry.require([BlockType::GRASS, BlockType::STONE]),
            Err(RegistryError::MissingDefinition(BlockType::STONE))
        ));
    }

    #[test]
    fn default_authoring_list_covers_the_terrain_blocks() {
        let registry = BlockRegistry::from_json(super::super::DEFAULT_BLOCKS_JSON).unwrap();
        assert!(registry
            .require([BlockType::GRASS, BlockType::DIRT, BlockType::STONE])
            .is_ok());
        assert!(!registry.contains(BlockType::AIR));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            BlockRegistry::from_json("[{ \"id\": 1 }"),
            Err(RegistryError::Parse(_))
        ));
    }
}
