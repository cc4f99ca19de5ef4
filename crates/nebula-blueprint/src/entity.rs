//! Entities carried by a blueprint as offsets from its local origin.

use glam::{DVec3, IVec3};
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

use crate::error::MalformedInputError;
use crate::orientation::{Axis, Rotation, rotate_vec};

/// A captured entity: where it stands inside the blueprint and its saved
/// state.
///
/// Positions are continuous; grid cell `c` spans `[c, c + 1)` on each axis.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityOffset {
    pub position: DVec3,
    pub data: NbtCompound,
}

impl EntityOffset {
    pub fn new(position: DVec3, data: NbtCompound) -> Self {
        Self { position, data }
    }

    /// Rotates the position together with a blueprint that was
    /// `original_size` large before the rotation.
    pub fn rotate(&mut self, axis: Axis, rotation: Rotation, original_size: IVec3) {
        let rotated_extent = rotate_vec(original_size.as_dvec3(), axis, rotation);
        let shift = -rotated_extent.min(DVec3::ZERO);
        self.position = rotate_vec(self.position, axis, rotation) + shift;
    }

    /// Reflects the position inside a blueprint of the given size.
    pub fn mirror(&mut self, axis: Axis, size: IVec3) {
        let extent = f64::from(axis.component(size));
        match axis {
            Axis::X => self.position.x = extent - self.position.x,
            Axis::Y => self.position.y = extent - self.position.y,
            Axis::Z => self.position.z = extent - self.position.z,
        }
    }

    pub fn to_nbt(&self) -> NbtCompound {
        let mut nbt = NbtCompound::new();
        let pos = NbtList::from(vec![
            NbtTag::Double(self.position.x),
            NbtTag::Double(self.position.y),
            NbtTag::Double(self.position.z),
        ]);
        nbt.insert("pos", NbtTag::List(pos));
        nbt.insert("data", NbtTag::Compound(self.data.clone()));
        nbt
    }

    pub fn from_nbt(nbt: &NbtCompound) -> Result<Self, MalformedInputError> {
        let pos = match nbt.get::<_, &NbtTag>("pos") {
            Ok(NbtTag::List(pos)) => pos,
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "pos",
                    reason: format!("expected a list, found {other}"),
                });
            }
            Err(_) => return Err(MalformedInputError::MissingField("pos")),
        };
        let coords = pos
            .iter()
            .map(|tag| match tag {
                NbtTag::Double(v) => Ok(*v),
                other => Err(MalformedInputError::InvalidField {
                    field: "pos",
                    reason: format!("expected doubles, found {other}"),
                }),
            })
            .collect::<Result<Vec<f64>, _>>()?;
        let &[x, y, z] = coords.as_slice() else {
            return Err(MalformedInputError::InvalidField {
                field: "pos",
                reason: format!("expected 3 components, found {}", coords.len()),
            });
        };

        let data = match nbt.get::<_, &NbtTag>("data") {
            Ok(NbtTag::Compound(data)) => data.clone(),
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "data",
                    reason: format!("expected a compound, found {other}"),
                });
            }
            Err(_) => NbtCompound::new(),
        };

        Ok(Self::new(DVec3::new(x, y, z), data))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
