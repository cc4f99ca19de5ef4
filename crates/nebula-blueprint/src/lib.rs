//! Blueprint capture, orientation transforms, and NBT persistence for cuboid
//! regions of a block world.

pub mod blueprint;
pub mod codec;
pub mod entity;
pub mod error;
pub mod orientation;
pub mod registry;
pub mod schematic;
mod transform;
pub mod world;

pub use blueprint::{Blueprint, PlacementReport};
pub use codec::{BlueprintHeader, FORMAT_VERSION, ROOT_NAME};
pub use entity::EntityOffset;
pub use error::{BlueprintError, MalformedInputError, WorldAccessError};
pub use orientation::{Axis, Direction, Rotation};
pub use registry::{RegistryError, SchematicFactory, SchematicRegistry};
pub use schematic::{BlockSchematic, Schematic};
pub use world::{BlockId, BlockState, MemoryWorld, WorldAccess};

pub use quartz_nbt::io::Flavor;
