//! The world collaborator a blueprint captures from and replays into.
//!
//! The blueprint engine never touches a real game world directly. It asks a
//! [`WorldAccess`] implementation for block states and hands states and
//! entities back to it on replay. [`MemoryWorld`] is a sparse in-memory
//! implementation used by tooling and tests.

use std::collections::BTreeMap;
use std::fmt;

use glam::{DVec3, IVec3};
use quartz_nbt::NbtCompound;
use rustc_hash::FxHashMap;

use crate::error::WorldAccessError;

/// Identifier of a block type, e.g. `"stone"` or `"oak_log"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub String);

impl BlockId {
    /// Reserved id of the empty block.
    pub const AIR: &'static str = "air";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn air() -> Self {
        Self(Self::AIR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_air(&self) -> bool {
        self.0 == Self::AIR
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Everything a world knows about the block at one position.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockState {
    /// Block type.
    pub block: BlockId,
    /// String-valued state properties (`facing`, `axis`, ...).
    pub properties: BTreeMap<String, String>,
    /// Auxiliary data such as a container's inventory.
    pub data: Option<NbtCompound>,
}

impl BlockState {
    /// A plain block with no properties and no auxiliary data.
    pub fn new(block: impl Into<BlockId>) -> Self {
        Self {
            block: block.into(),
            properties: BTreeMap::new(),
            data: None,
        }
    }

    pub fn air() -> Self {
        Self::new(BlockId::air())
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: NbtCompound) -> Self {
        self.data = Some(data);
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl From<BlockId> for BlockState {
    fn from(block: BlockId) -> Self {
        Self::new(block)
    }
}

/// Read/write access to a live world region.
///
/// Callers must hold whatever lock or session keeps the region stable for
/// the duration of a capture or replay.
pub trait WorldAccess {
    /// Returns the full state of the block at `pos`.
    fn block_at(&self, pos: IVec3) -> Result<BlockState, WorldAccessError>;

    /// Returns only the block type at `pos`.
    fn block_type_at(&self, pos: IVec3) -> Result<BlockId, WorldAccessError> {
        Ok(self.block_at(pos)?.block)
    }

    /// Replaces the block at `pos`.
    fn set_block(&mut self, pos: IVec3, state: BlockState) -> Result<(), WorldAccessError>;

    /// Spawns an entity described by `data` at `pos`.
    fn spawn_entity(&mut self, pos: DVec3, data: &NbtCompound) -> Result<(), WorldAccessError>;
}

/// A sparse in-memory world. Positions never written read back as air.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    blocks: FxHashMap<IVec3, BlockState>,
    /// Inclusive loaded region; `None` means everything is loaded.
    loaded: Option<(IVec3, IVec3)>,
    entities: Vec<(DVec3, NbtCompound)>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts access to the inclusive box `[min, max]`. Anything outside
    /// reports [`WorldAccessError::Unloaded`].
    pub fn with_loaded_region(mut self, min: IVec3, max: IVec3) -> Self {
        self.loaded = Some((min.min(max), min.max(max)));
        self
    }

    /// Sets a block without bounds checks, for setting up fixtures.
    pub fn insert(&mut self, pos: IVec3, state: BlockState) {
        if state.block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
    }

    /// Number of non-air blocks stored.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Entities spawned so far, in spawn order.
    pub fn entities(&self) -> &[(DVec3, NbtCompound)] {
        &self.entities
    }

    fn check_loaded(&self, pos: IVec3) -> Result<(), WorldAccessError> {
        match self.loaded {
            Some((min, max)) if pos.cmplt(min).any() || pos.cmpgt(max).any() => {
                Err(WorldAccessError::Unloaded(pos))
            }
            _ => Ok(()),
        }
    }
}

impl WorldAccess for MemoryWorld {
    fn block_at(&self, pos: IVec3) -> Result<BlockState, WorldAccessError> {
        self.check_loaded(pos)?;
        Ok(self
            .blocks
            .get(&pos)
            .cloned()
            .unwrap_or_else(BlockState::air))
    }

    fn set_block(&mut self, pos: IVec3, state: BlockState) -> Result<(), WorldAccessError> {
        self.check_loaded(pos)?;
        self.insert(pos, state);
        Ok(())
    }

    fn spawn_entity(&mut self, pos: DVec3, data: &NbtCompound) -> Result<(), WorldAccessError> {
        self.check_loaded(pos.floor().as_ivec3())?;
        self.entities.push((pos, data.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
