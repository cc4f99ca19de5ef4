//! NBT document encoding for [`Blueprint`].
//!
//! ## Document layout
//!
//! | Field | Tag | Notes |
//! |-------|-----|-------|
//! | `version` | Int | format version, currently 1 (absent means 1) |
//! | `size` | IntArray\[3\] | grid extents, each > 0 |
//! | `offset` | IntArray\[3\] | placement offset |
//! | `blocks` | List of Compound | exactly `size.x * size.y * size.z` schematic records |
//! | `entities` | List of Compound | entity offsets (absent means none) |
//!
//! `blocks` is positional: record `i` belongs to the cell at flat index `i`,
//! iterating x outermost and z innermost.
//!
//! On disk the document is a named root compound (`"blueprint"`) written with
//! `quartz_nbt`, optionally gzip or zlib compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use glam::IVec3;
use quartz_nbt::io::{Flavor, read_nbt, write_nbt};
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

use crate::blueprint::{Blueprint, checked_volume, pos_of};
use crate::entity::EntityOffset;
use crate::error::{BlueprintError, MalformedInputError};
use crate::registry::SchematicRegistry;

/// Current document format version.
pub const FORMAT_VERSION: i32 = 1;

/// Name of the root compound in binary files.
pub const ROOT_NAME: &str = "blueprint";

/// Size and offset shared by every blueprint document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlueprintHeader {
    pub size: IVec3,
    pub offset: IVec3,
}

impl BlueprintHeader {
    pub fn to_nbt(&self) -> NbtCompound {
        let mut nbt = NbtCompound::new();
        nbt.insert("version", NbtTag::Int(FORMAT_VERSION));
        nbt.insert("size", int_array(self.size));
        nbt.insert("offset", int_array(self.offset));
        nbt
    }

    /// Reads the header fields of a document. The size must be positive.
    pub fn from_nbt(nbt: &NbtCompound) -> Result<Self, MalformedInputError> {
        let version = match nbt.get::<_, &NbtTag>("version") {
            Ok(NbtTag::Int(v)) => *v,
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "version",
                    reason: format!("expected an int, found {other}"),
                });
            }
            Err(_) => FORMAT_VERSION,
        };
        if version != FORMAT_VERSION {
            return Err(MalformedInputError::UnsupportedVersion(version));
        }

        let size = read_ivec3(nbt, "size")?;
        checked_volume(size)?;
        let offset = read_ivec3(nbt, "offset")?;
        Ok(Self { size, offset })
    }
}

impl Blueprint {
    pub fn header(&self) -> BlueprintHeader {
        BlueprintHeader {
            size: self.size,
            offset: self.offset,
        }
    }

    /// Encodes the blueprint as an NBT document.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UninitializedCell`] for the first cell that
    /// holds no schematic. A document is never written with a hole in it.
    pub fn to_nbt(&self) -> Result<NbtCompound, BlueprintError> {
        let mut nbt = self.header().to_nbt();

        let mut blocks = Vec::with_capacity(self.cells.len());
        for (index, cell) in self.cells.iter().enumerate() {
            let Some(schematic) = cell else {
                return Err(BlueprintError::UninitializedCell {
                    pos: pos_of(index, self.size),
                });
            };
            blocks.push(NbtTag::Compound(schematic.to_nbt()));
        }
        nbt.insert("blocks", NbtTag::List(NbtList::from(blocks)));

        let entities: Vec<NbtTag> = self
            .entities
            .iter()
            .map(|entity| NbtTag::Compound(entity.to_nbt()))
            .collect();
        nbt.insert("entities", NbtTag::List(NbtList::from(entities)));

        Ok(nbt)
    }

    /// Decodes a document produced by [`Blueprint::to_nbt`], resolving each
    /// block record through `registry`.
    ///
    /// # Errors
    ///
    /// Any structural problem, count mismatch, or undecodable record yields
    /// a [`MalformedInputError`]; no partial blueprint is returned.
    pub fn from_nbt(
        nbt: &NbtCompound,
        registry: &SchematicRegistry,
    ) -> Result<Self, MalformedInputError> {
        let header = BlueprintHeader::from_nbt(nbt)?;
        let volume = checked_volume(header.size)?;

        // The count check runs before anything is sized from the header, so
        // a tiny document cannot request a huge grid.
        let blocks = match nbt.get::<_, &NbtTag>("blocks") {
            Ok(NbtTag::List(blocks)) => blocks,
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "blocks",
                    reason: format!("expected a list, found {other}"),
                });
            }
            Err(_) => return Err(MalformedInputError::MissingField("blocks")),
        };
        if blocks.len() != volume {
            return Err(MalformedInputError::BlockCountMismatch {
                expected: volume,
                actual: blocks.len(),
            });
        }

        let mut cells = Vec::with_capacity(blocks.len());
        for (index, tag) in blocks.iter().enumerate() {
            let NbtTag::Compound(record) = tag else {
                return Err(MalformedInputError::UndecodableRecord {
                    index,
                    reason: format!("expected a compound, found {tag}"),
                });
            };
            let schematic =
                registry
                    .decode(record)
                    .map_err(|e| MalformedInputError::UndecodableRecord {
                        index,
                        reason: e.to_string(),
                    })?;
            cells.push(Some(schematic));
        }

        let entities = match nbt.get::<_, &NbtTag>("entities") {
            Ok(NbtTag::List(list)) => list
                .iter()
                .map(|tag| match tag {
                    NbtTag::Compound(record) => EntityOffset::from_nbt(record),
                    other => Err(MalformedInputError::InvalidField {
                        field: "entities",
                        reason: format!("expected compounds, found {other}"),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Ok(other) => {
                return Err(MalformedInputError::InvalidField {
                    field: "entities",
                    reason: format!("expected a list, found {other}"),
                });
            }
            Err(_) => Vec::new(),
        };

        Ok(Blueprint {
            size: header.size,
            offset: header.offset,
            cells,
            entities,
        })
    }

    /// Writes the blueprint as a binary NBT file body.
    pub fn write_to<W: Write>(&self, writer: &mut W, flavor: Flavor) -> Result<(), BlueprintError> {
        let nbt = self.to_nbt()?;
        write_nbt(writer, Some(ROOT_NAME), &nbt, flavor)?;
        Ok(())
    }

    /// Reads a blueprint from a binary NBT stream.
    pub fn read_from<R: Read>(
        reader: &mut R,
        registry: &SchematicRegistry,
        flavor: Flavor,
    ) -> Result<Self, BlueprintError> {
        let (nbt, root_name) = read_nbt(reader, flavor)?;
        if root_name != ROOT_NAME {
            tracing::warn!("blueprint root tag is named {root_name:?}, expected {ROOT_NAME:?}");
        }
        Ok(Self::from_nbt(&nbt, registry)?)
    }

    /// Saves the blueprint to `path`.
    pub fn save(&self, path: &Path, flavor: Flavor) -> Result<(), BlueprintError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, flavor)?;
        writer.flush()?;
        tracing::debug!("saved blueprint {} to {}", self.size, path.display());
        Ok(())
    }

    /// Loads a blueprint from `path`.
    pub fn load(
        path: &Path,
        registry: &SchematicRegistry,
        flavor: Flavor,
    ) -> Result<Self, BlueprintError> {
        let mut reader = BufReader::new(File::open(path)?);
        let blueprint = Self::read_from(&mut reader, registry, flavor)?;
        tracing::debug!("loaded blueprint {} from {}", blueprint.size, path.display());
        Ok(blueprint)
    }
}

fn int_array(v: IVec3) -> NbtTag {
    NbtTag::IntArray(vec![v.x, v.y, v.z])
}

fn read_ivec3(nbt: &NbtCompound, field: &'static str) -> Result<IVec3, MalformedInputError> {
    match nbt.get::<_, &NbtTag>(field) {
        Ok(NbtTag::IntArray(values)) if values.len() == 3 => {
            Ok(IVec3::new(values[0], values[1], values[2]))
        }
        Ok(other) => Err(MalformedInputError::InvalidField {
            field,
            reason: format!("expected an int array of length 3, found {other}"),
        }),
        Err(_) => Err(MalformedInputError::MissingField(field)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use glam::DVec3;

    use super::*;
    use crate::registry::SchematicFactory;
    use crate::schematic::{BlockSchematic, Schematic};
    use crate::world::BlockState;

    fn registry() -> SchematicRegistry {
        let mut registry = SchematicRegistry::new();
        registry.register("a", SchematicFactory::standard()).unwrap();
        registry.register("b", SchematicFactory::standard()).unwrap();
        registry.register("chest", SchematicFactory::standard()).unwrap();
        registry
    }

    fn two_by_one() -> Blueprint {
        let mut bp = Blueprint::new(IVec3::new(2, 1, 1), IVec3::ZERO).unwrap();
        bp.set_schematic(IVec3::ZERO, Schematic::block("a"));
        bp.set_schematic(IVec3::X, Schematic::block("b"));
        bp
    }

    fn mixed() -> Blueprint {
        let mut bp = Blueprint::new(IVec3::new(2, 2, 2), IVec3::new(-3, 1, 4)).unwrap();
        let mut inventory = NbtCompound::new();
        inventory.insert("slots", NbtTag::Int(27));
        for (i, pos) in (0..8).map(|i| (i, pos_of(i, IVec3::splat(2)))) {
            let schematic = match i % 3 {
                0 => Schematic::Air,
                1 => Schematic::block("a"),
                _ => Schematic::Block(BlockSchematic::new(
                    BlockState::new("chest")
                        .with_property("facing", "west")
                        .with_data(inventory.clone()),
                )),
            };
            bp.set_schematic(pos, schematic);
        }
        let mut pig = NbtCompound::new();
        pig.insert("id", NbtTag::String("pig".to_string()));
        bp.add_entity(EntityOffset::new(DVec3::new(1.5, 0.0, 0.5), pig));
        bp
    }

    fn block_ids(nbt: &NbtCompound) -> Vec<String> {
        let blocks = nbt.get::<_, &NbtList>("blocks").unwrap();
        blocks
            .iter()
            .map(|tag| match tag {
                NbtTag::Compound(c) => c.get::<_, &str>("id").unwrap().to_string(),
                other => panic!("unexpected tag {other}"),
            })
            .collect()
    }

    #[test]
    fn test_blocks_written_in_grid_order() {
        let nbt = two_by_one().to_nbt().unwrap();
        assert_eq!(block_ids(&nbt), vec!["a", "b"]);

        let mut bp = Blueprint::new(IVec3::new(1, 2, 2), IVec3::ZERO).unwrap();
        bp.set_schematic(IVec3::new(0, 0, 0), Schematic::block("a"));
        bp.set_schematic(IVec3::new(0, 0, 1), Schematic::block("b"));
        bp.set_schematic(IVec3::new(0, 1, 0), Schematic::block("chest"));
        bp.set_schematic(IVec3::new(0, 1, 1), Schematic::Air);
        let nbt = bp.to_nbt().unwrap();
        assert_eq!(block_ids(&nbt), vec!["a", "b", "chest", "air"]);
    }

    #[test]
    fn test_header_fields() {
        let nbt = mixed().to_nbt().unwrap();
        let header = BlueprintHeader::from_nbt(&nbt).unwrap();
        assert_eq!(header.size, IVec3::splat(2));
        assert_eq!(header.offset, IVec3::new(-3, 1, 4));
        assert_eq!(nbt.get::<_, i32>("version").unwrap(), FORMAT_VERSION);
    }

    #[test]
    fn test_document_roundtrip() {
        let bp = mixed();
        let decoded = Blueprint::from_nbt(&bp.to_nbt().unwrap(), &registry()).unwrap();
        assert_eq!(decoded, bp);
    }

    #[test]
    fn test_binary_roundtrip_all_flavors() {
        let bp = mixed();
        for flavor in [Flavor::Uncompressed, Flavor::GzCompressed, Flavor::ZlibCompressed] {
            let mut buf = Vec::new();
            bp.write_to(&mut buf, flavor).unwrap();
            let decoded = Blueprint::read_from(&mut Cursor::new(buf), &registry(), flavor).unwrap();
            assert_eq!(decoded, bp);
        }
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.nbt");
        let bp = mixed();
        bp.save(&path, Flavor::GzCompressed).unwrap();
        let loaded = Blueprint::load(&path, &registry(), Flavor::GzCompressed).unwrap();
        assert_eq!(loaded, bp);
    }

    #[test]
    fn test_uninitialized_cell_refuses_to_serialize() {
        let mut bp = two_by_one();
        bp.cells[1] = None;
        let result = bp.to_nbt();
        assert!(matches!(
            result,
            Err(BlueprintError::UninitializedCell { pos }) if pos == IVec3::X
        ));
        let mut buf = Vec::new();
        assert!(bp.write_to(&mut buf, Flavor::Uncompressed).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_block_count_mismatch_rejected() {
        let mut nbt = two_by_one().to_nbt().unwrap();
        nbt.insert(
            "blocks",
            NbtTag::List(NbtList::from(vec![NbtTag::Compound(
                Schematic::block("a").to_nbt(),
            )])),
        );
        assert_eq!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::BlockCountMismatch {
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_unknown_block_record_rejected() {
        let mut bp = two_by_one();
        bp.set_schematic(IVec3::X, Schematic::block("unobtainium"));
        let nbt = bp.to_nbt().unwrap();
        let result = Blueprint::from_nbt(&nbt, &registry());
        match result {
            Err(MalformedInputError::UndecodableRecord { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("unobtainium"), "reason: {reason}");
            }
            other => panic!("expected UndecodableRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_non_compound_record_rejected() {
        let mut nbt = two_by_one().to_nbt().unwrap();
        nbt.insert(
            "blocks",
            NbtTag::List(NbtList::from(vec![NbtTag::Int(1), NbtTag::Int(2)])),
        );
        assert!(matches!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::UndecodableRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_and_invalid_header_fields() {
        let mut nbt = two_by_one().to_nbt().unwrap();
        nbt.insert("size", NbtTag::IntArray(vec![2, 1]));
        assert!(matches!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::InvalidField { field: "size", .. })
        ));

        nbt.insert("size", NbtTag::IntArray(vec![2, 0, 1]));
        assert!(matches!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::NonPositiveSize(_))
        ));

        let mut nbt = NbtCompound::new();
        nbt.insert("size", int_array(IVec3::ONE));
        assert_eq!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::MissingField("offset"))
        );
        nbt.insert("offset", int_array(IVec3::ZERO));
        assert_eq!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::MissingField("blocks"))
        );
    }

    #[test]
    fn test_oversized_header_with_short_block_list_rejected() {
        let mut nbt = NbtCompound::new();
        nbt.insert("size", int_array(IVec3::splat(1290)));
        nbt.insert("offset", int_array(IVec3::ZERO));
        nbt.insert("blocks", NbtTag::List(NbtList::from(Vec::<NbtTag>::new())));
        assert_eq!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::BlockCountMismatch {
                expected: 1290 * 1290 * 1290,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_blocks_of_wrong_type_rejected() {
        let mut nbt = two_by_one().to_nbt().unwrap();
        nbt.insert("blocks", NbtTag::Int(2));
        assert!(matches!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::InvalidField { field: "blocks", .. })
        ));
    }

    #[test]
    fn test_entities_of_wrong_type_rejected() {
        let mut nbt = two_by_one().to_nbt().unwrap();
        nbt.insert("entities", NbtTag::Int(5));
        assert!(matches!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::InvalidField { field: "entities", .. })
        ));

        nbt.insert("entities", NbtTag::List(NbtList::from(vec![NbtTag::Int(5)])));
        assert!(matches!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::InvalidField { field: "entities", .. })
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut nbt = two_by_one().to_nbt().unwrap();
        nbt.insert("version", NbtTag::Int(FORMAT_VERSION + 1));
        assert_eq!(
            Blueprint::from_nbt(&nbt, &registry()),
            Err(MalformedInputError::UnsupportedVersion(FORMAT_VERSION + 1))
        );
    }

    #[test]
    fn test_document_without_entities_or_version_loads() {
        let bp = two_by_one();
        let mut nbt = NbtCompound::new();
        nbt.insert("size", int_array(bp.size()));
        nbt.insert("offset", int_array(bp.offset()));
        nbt.insert(
            "blocks",
            NbtTag::List(NbtList::from(vec![
                NbtTag::Compound(Schematic::block("a").to_nbt()),
                NbtTag::Compound(Schematic::block("b").to_nbt()),
            ])),
        );
        let decoded = Blueprint::from_nbt(&nbt, &registry()).unwrap();
        assert_eq!(decoded, bp);
        assert!(decoded.entities().is_empty());
    }

    #[test]
    fn test_transformed_blueprint_roundtrips() {
        let mut bp = mixed();
        bp.rotate(crate::orientation::Axis::Z, crate::orientation::Rotation::Clockwise90);
        bp.mirror(crate::orientation::Axis::Y);
        let decoded = Blueprint::from_nbt(&bp.to_nbt().unwrap(), &registry()).unwrap();
        assert_eq!(decoded, bp);
    }
}
