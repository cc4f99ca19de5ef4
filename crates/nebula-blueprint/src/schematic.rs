//! Captured representation of a single block.
//!
//! A [`Schematic`] is exclusively owned by the blueprint cell holding it.
//! Rotating or mirroring a schematic only updates its own orientation state;
//! moving it inside the grid is the blueprint's job.
//!
//! ## Record format
//!
//! | Field | Tag | Notes |
//! |-------|-----|-------|
//! | `id` | String | block type, `"air"` for [`Schematic::Air`] |
//! | `properties` | Compound of String | omitted when empty |
//! | `data` | Compound | omitted when the block has no auxiliary data |

use std::collections::BTreeMap;

use glam::IVec3;
use quartz_nbt::{NbtCompound, NbtTag};

use crate::error::{MalformedInputError, WorldAccessError};
use crate::orientation::{Axis, Direction, Rotation, rotate_axis};
use crate::world::{BlockId, BlockState, WorldAccess};

/// Property holding a [`Direction`] name.
const FACING: &str = "facing";
/// Property holding an [`Axis`] name.
const AXIS: &str = "axis";

/// One captured grid cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Schematic {
    /// Explicitly empty content. Replaying it clears the target block.
    Air,
    /// A concrete block with its state.
    Block(BlockSchematic),
}

impl Schematic {
    /// Shorthand for a block schematic without properties or data.
    pub fn block(id: impl Into<BlockId>) -> Self {
        Schematic::Block(BlockSchematic::new(BlockState::new(id)))
    }

    pub fn block_type(&self) -> BlockId {
        match self {
            Schematic::Air => BlockId::air(),
            Schematic::Block(block) => block.state.block.clone(),
        }
    }

    pub fn is_air(&self) -> bool {
        matches!(self, Schematic::Air)
    }

    /// Encodes this schematic as a standalone compound record.
    pub fn to_nbt(&self) -> NbtCompound {
        match self {
            Schematic::Air => {
                let mut nbt = NbtCompound::new();
                nbt.insert("id", NbtTag::String(BlockId::AIR.to_string()));
                nbt
            }
            Schematic::Block(block) => block.to_nbt(),
        }
    }

    /// Updates orientation state for a rotation of the whole blueprint.
    pub fn rotate(&mut self, axis: Axis, rotation: Rotation) {
        if let Schematic::Block(block) = self {
            block.rotate(axis, rotation);
        }
    }

    /// Updates orientation state for a mirror of the whole blueprint.
    pub fn mirror(&mut self, axis: Axis) {
        if let Schematic::Block(block) = self {
            block.mirror(axis);
        }
    }

    /// Writes this schematic into `world` at `pos`.
    pub fn place_into(&self, world: &mut dyn WorldAccess, pos: IVec3) -> Result<(), WorldAccessError> {
        match self {
            Schematic::Air => world.set_block(pos, BlockState::air()),
            Schematic::Block(block) => world.set_block(pos, block.state.clone()),
        }
    }
}

/// A block captured with its full state.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSchematic {
    state: BlockState,
}

impl BlockSchematic {
    pub fn new(state: BlockState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &BlockState {
        &self.state
    }

    pub fn into_state(self) -> BlockState {
        self.state
    }

    pub fn rotate(&mut self, axis: Axis, rotation: Rotation) {
        if let Some(facing) = self.direction_property() {
            self.set_property(FACING, facing.rotate(axis, rotation).name());
        }
        if let Some(value) = self.axis_property() {
            self.set_property(AXIS, rotate_axis(value, axis, rotation).name());
        }
    }

    pub fn mirror(&mut self, axis: Axis) {
        if let Some(facing) = self.direction_property() {
            self.set_property(FACING, facing.mirror(axis).name());
        }
    }

    pub fn to_nbt(&self) -> NbtCompound {
        let mut nbt = NbtCompound::new();
        nbt.insert("id", NbtTag::String(self.state.block.0.clone()));
        if !self.state.properties.is_empty() {
            let mut props = NbtCompound::new();
            for (key, value) in &self.state.properties {
                props.insert(key.clone(), NbtTag::String(value.clone()));
            }
            nbt.insert("properties", NbtTag::Compound(props));
        }
        if let Some(data) = &self.state.data {
            nbt.insert("data", NbtTag::Compound(data.clone()));
        }
        nbt
    }

    /// Decodes a record written by [`BlockSchematic::to_nbt`].
    pub fn from_nbt(nbt: &NbtCompound) -> Result<Self, MalformedInputError> {
        let block = record_id(nbt)?;

        let mut properties = BTreeMap::new();
        match nbt.get::<_, &NbtTag>("properties") {
            Ok(NbtTag::Compound(props)) => {
                for (key, value) in props.inner() {
                    match value {
                        NbtTag::String(value) => {
                            properties.insert(key.clone(), value.clone());
                        }
                        other => {
                            return Err(MalformedInputError::InvalidField {
                                field: "properties",
                                reason: format!("property `{key}` is not a string: {other}"),
                            });
                        }
                    }
                }
            }
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "properties",
                    reason: format!("expected a compound, found {other}"),
                });
            }
            Err(_) => {}
        }

        let data = match nbt.get::<_, &NbtTag>("data") {
            Ok(NbtTag::Compound(data)) => Some(data.clone()),
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "data",
                    reason: format!("expected a compound, found {other}"),
                });
            }
            Err(_) => None,
        };

        Ok(Self {
            state: BlockState {
                block,
                properties,
                data,
            },
        })
    }

    fn direction_property(&self) -> Option<Direction> {
        self.state.property(FACING).and_then(Direction::from_name)
    }

    fn axis_property(&self) -> Option<Axis> {
        self.state.property(AXIS).and_then(Axis::from_name)
    }

    fn set_property(&mut self, key: &str, value: &str) {
        self.state.properties.insert(key.to_string(), value.to_string());
    }
}

/// Reads the mandatory `id` field of a schematic record.
pub fn record_id(nbt: &NbtCompound) -> Result<BlockId, MalformedInputError> {
    match nbt.get::<_, &NbtTag>("id") {
        Ok(NbtTag::String(id)) if !id.is_empty() => Ok(BlockId::new(id.clone())),
        Ok(other) => Err(MalformedInputError::InvalidField {
            field: "id",
            reason: format!("expected a non-empty string, found {other}"),
        }),
        Err(_) => Err(MalformedInputError::MissingField("id")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
