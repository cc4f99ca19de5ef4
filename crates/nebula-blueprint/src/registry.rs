//! Schematic factory registry: maps a [`BlockId`] to the pair of closures that
//! capture that block type from a world and decode it from a record.
//!
//! The registry is built once by the caller and passed explicitly into
//! capture and deserialization. Air is always registered so that empty space
//! captures and decodes without any setup.

use std::collections::HashMap;
use std::fmt;

use glam::IVec3;
use quartz_nbt::NbtCompound;
use thiserror::Error;

use crate::error::{MalformedInputError, WorldAccessError};
use crate::schematic::{BlockSchematic, Schematic, record_id};
use crate::world::{BlockId, WorldAccess};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Captures the block at a position, or returns `None` when the block
/// declares itself non-capturable.
pub type CaptureFn = dyn Fn(&dyn WorldAccess, IVec3) -> Result<Option<Schematic>, WorldAccessError>
    + Send
    + Sync;

/// Rebuilds a schematic from one persisted record.
pub type DecodeFn = dyn Fn(&NbtCompound) -> Result<Schematic, MalformedInputError> + Send + Sync;

/// Capture and decode entry points for one block type.
pub struct SchematicFactory {
    capture: Box<CaptureFn>,
    decode: Box<DecodeFn>,
}

impl SchematicFactory {
    pub fn new<C, D>(capture: C, decode: D) -> Self
    where
        C: Fn(&dyn WorldAccess, IVec3) -> Result<Option<Schematic>, WorldAccessError>
            + Send
            + Sync
            + 'static,
        D: Fn(&NbtCompound) -> Result<Schematic, MalformedInputError> + Send + Sync + 'static,
    {
        Self {
            capture: Box::new(capture),
            decode: Box::new(decode),
        }
    }

    /// Captures the full block state into a [`BlockSchematic`].
    pub fn standard() -> Self {
        Self::new(
            |world, pos| {
                let state = world.block_at(pos)?;
                Ok(Some(Schematic::Block(BlockSchematic::new(state))))
            },
            |nbt| BlockSchematic::from_nbt(nbt).map(Schematic::Block),
        )
    }

    /// A block type that is never captured (it becomes air in a blueprint)
    /// but whose records still decode.
    pub fn non_capturable() -> Self {
        Self::new(
            |_, _| Ok(None),
            |nbt| BlockSchematic::from_nbt(nbt).map(Schematic::Block),
        )
    }

    /// Factory for the reserved air block.
    pub fn air() -> Self {
        Self::new(|_, _| Ok(Some(Schematic::Air)), |_| Ok(Schematic::Air))
    }

    pub fn capture_from(
        &self,
        world: &dyn WorldAccess,
        pos: IVec3,
    ) -> Result<Option<Schematic>, WorldAccessError> {
        (self.capture)(world, pos)
    }

    pub fn decode(&self, nbt: &NbtCompound) -> Result<Schematic, MalformedInputError> {
        (self.decode)(nbt)
    }
}

impl fmt::Debug for SchematicFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchematicFactory").finish_non_exhaustive()
    }
}

/// Errors that can occur during factory registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A factory for this block type has already been registered.
    #[error("duplicate schematic factory for block: {0}")]
    DuplicateBlock(BlockId),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps block types to their [`SchematicFactory`].
#[derive(Debug)]
pub struct SchematicRegistry {
    factories: HashMap<BlockId, SchematicFactory>,
    /// Decoder used for records whose id has no registered factory.
    fallback: Option<SchematicFactory>,
}

impl SchematicRegistry {
    /// Creates a registry with only air registered.
    pub fn new() -> Self {
        let mut factories = HashMap::new();
        factories.insert(BlockId::air(), SchematicFactory::air());
        Self {
            factories,
            fallback: None,
        }
    }

    /// A registry that decodes any record id with the standard block decoder.
    ///
    /// Capture is unaffected: unregistered blocks still become air.
    pub fn permissive() -> Self {
        Self::new().with_fallback(SchematicFactory::standard())
    }

    pub fn with_fallback(mut self, factory: SchematicFactory) -> Self {
        self.fallback = Some(factory);
        self
    }

    /// Registers the factory for a block type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateBlock`] if the block type already
    /// has a factory (air included).
    pub fn register(
        &mut self,
        block: impl Into<BlockId>,
        factory: SchematicFactory,
    ) -> Result<(), RegistryError> {
        let block = block.into();
        if self.factories.contains_key(&block) {
            return Err(RegistryError::DuplicateBlock(block));
        }
        self.factories.insert(block, factory);
        Ok(())
    }

    /// Returns the capture factory for a block type, if any.
    pub fn factory_for(&self, block: &BlockId) -> Option<&SchematicFactory> {
        self.factories.get(block)
    }

    pub fn contains(&self, block: &BlockId) -> bool {
        self.factories.contains_key(block)
    }

    /// Decodes one persisted schematic record by dispatching on its `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInputError::UnknownBlock`] when no factory (and no
    /// fallback) handles the id, or whatever the block's decoder reports.
    pub fn decode(&self, nbt: &NbtCompound) -> Result<Schematic, MalformedInputError> {
        let id = record_id(nbt)?;
        match self.factories.get(&id) {
            Some(factory) => factory.decode(nbt),
            None => match &self.fallback {
                Some(fallback) => {
                    tracing::trace!("decoding unregistered block {id} with fallback");
                    fallback.decode(nbt)
                }
                None => Err(MalformedInputError::UnknownBlock(id.0)),
            },
        }
    }

    /// Returns the number of registered block types (including air).
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.len() <= 1
    }
}

impl Default for SchematicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
