//! The blueprint container: a fixed-size grid of schematic cells plus entity
//! offsets.
//!
//! Cells live in one flat buffer ordered x-major, then y, then z-minor. That
//! is both the capture order and the order of the persisted `blocks` list.
//! An empty slot (`None`) marks a cell that was never initialized; explicit
//! empty content is [`Schematic::Air`].

use glam::{DVec3, IVec3};

use crate::entity::EntityOffset;
use crate::error::{BlueprintError, MalformedInputError, WorldAccessError};
use crate::registry::SchematicRegistry;
use crate::schematic::Schematic;
use crate::world::WorldAccess;

/// A captured cuboid region.
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub(crate) size: IVec3,
    pub(crate) offset: IVec3,
    pub(crate) cells: Vec<Option<Schematic>>,
    pub(crate) entities: Vec<EntityOffset>,
}

/// Summary of a [`Blueprint::place_into`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Non-air schematics written.
    pub blocks_placed: usize,
    /// Air cells written (clearing whatever was there).
    pub air_cleared: usize,
    /// Uninitialized cells left untouched.
    pub skipped: usize,
    pub entities_spawned: usize,
}

impl Blueprint {
    /// Creates a blueprint with every cell uninitialized and no entities.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInputError::NonPositiveSize`] unless every
    /// component of `size` is at least 1.
    pub fn new(size: IVec3, offset: IVec3) -> Result<Self, MalformedInputError> {
        let volume = checked_volume(size)?;
        Ok(Self {
            size,
            offset,
            cells: vec![None; volume],
            entities: Vec::new(),
        })
    }

    /// Builds a blueprint from a nested `[x][y][z]` grid. The size is taken
    /// from the grid's dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInputError::JaggedGrid`] if rows on any level have
    /// differing lengths, or [`MalformedInputError::NonPositiveSize`] if any
    /// level is empty.
    pub fn from_grid(
        offset: IVec3,
        grid: Vec<Vec<Vec<Option<Schematic>>>>,
        entities: Vec<EntityOffset>,
    ) -> Result<Self, MalformedInputError> {
        let sx = grid.len();
        let sy = grid.first().map_or(0, Vec::len);
        let sz = grid
            .first()
            .and_then(|plane| plane.first())
            .map_or(0, Vec::len);

        for (x, plane) in grid.iter().enumerate() {
            if plane.len() != sy {
                return Err(MalformedInputError::JaggedGrid {
                    at: format!("x={x}"),
                    expected: sy,
                    found: plane.len(),
                });
            }
            for (y, column) in plane.iter().enumerate() {
                if column.len() != sz {
                    return Err(MalformedInputError::JaggedGrid {
                        at: format!("x={x},y={y}"),
                        expected: sz,
                        found: column.len(),
                    });
                }
            }
        }

        let size = IVec3::new(dim(sx), dim(sy), dim(sz));
        checked_volume(size)?;
        let cells = grid.into_iter().flatten().flatten().collect();
        Ok(Self {
            size,
            offset,
            cells,
            entities,
        })
    }

    /// Captures the cuboid `[origin, origin + size)` from `world`.
    ///
    /// Each position is resolved to a block type, looked up in `registry`,
    /// and captured by that type's factory. Blocks with no factory, or whose
    /// factory declines, become [`Schematic::Air`]. Entities are not
    /// captured.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive `size`, on a region extending past the `i32`
    /// coordinate range, or on the first position the world cannot serve. No blueprint is returned in either case.
    pub fn capture(
        world: &dyn WorldAccess,
        registry: &SchematicRegistry,
        origin: IVec3,
        size: IVec3,
    ) -> Result<Self, BlueprintError> {
        let mut blueprint = Self::new(size, IVec3::ZERO)?;
        far_corner(origin, size)?;
        let mut uncaptured = 0usize;

        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    let local = IVec3::new(x, y, z);
                    let pos = origin + local;
                    let block = world.block_type_at(pos)?;
                    let captured = match registry.factory_for(&block) {
                        Some(factory) => factory.capture_from(world, pos)?,
                        None => None,
                    };
                    let schematic = captured.unwrap_or_else(|| {
                        uncaptured += 1;
                        Schematic::Air
                    });
                    blueprint.set_schematic(local, schematic);
                }
            }
        }

        tracing::debug!(
            "captured {} blocks at {} ({} without a factory)",
            blueprint.volume(),
            origin,
            uncaptured
        );
        Ok(blueprint)
    }

    /// Replays this blueprint into `world` relative to `anchor`.
    ///
    /// Cell `local` lands at `anchor + offset + local`; entities are spawned
    /// at `anchor + offset + position`. Uninitialized cells are skipped.
    pub fn place_into(
        &self,
        world: &mut dyn WorldAccess,
        anchor: IVec3,
    ) -> Result<PlacementReport, BlueprintError> {
        let base = anchor + self.offset;
        let mut report = PlacementReport::default();

        for (local, cell) in self.iter() {
            match cell {
                Some(schematic) => {
                    schematic.place_into(world, base + local)?;
                    if schematic.is_air() {
                        report.air_cleared += 1;
                    } else {
                        report.blocks_placed += 1;
                    }
                }
                None => report.skipped += 1,
            }
        }

        let base = base.as_dvec3();
        for entity in &self.entities {
            world.spawn_entity(base + entity.position, &entity.data)?;
            report.entities_spawned += 1;
        }

        tracing::debug!("placed blueprint at {}: {:?}", anchor, report);
        Ok(report)
    }

    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn offset(&self) -> IVec3 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: IVec3) {
        self.offset = offset;
    }

    /// Total number of cells.
    pub fn volume(&self) -> usize {
        self.cells.len()
    }

    /// Returns the cell at a local position. `pos` must lie in `[0, size)`.
    pub fn schematic_at(&self, pos: IVec3) -> Option<&Schematic> {
        self.cells[self.index_of(pos)].as_ref()
    }

    pub fn schematic_at_mut(&mut self, pos: IVec3) -> Option<&mut Schematic> {
        let index = self.index_of(pos);
        self.cells[index].as_mut()
    }

    /// Stores a schematic at a local position, returning the previous one.
    /// `pos` must lie in `[0, size)`.
    pub fn set_schematic(&mut self, pos: IVec3, schematic: Schematic) -> Option<Schematic> {
        let index = self.index_of(pos);
        self.cells[index].replace(schematic)
    }

    /// Iterates all cells in grid order with their local positions.
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, Option<&Schematic>)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (pos_of(index, size), cell.as_ref()))
    }

    /// Number of cells that were never initialized.
    pub fn uninitialized_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// `true` when every cell holds a schematic, i.e. the blueprint can be
    /// serialized.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn entities(&self) -> &[EntityOffset] {
        &self.entities
    }

    pub fn add_entity(&mut self, entity: EntityOffset) {
        self.entities.push(entity);
    }

    /// Local position of `world_pos` for a blueprint placed at `anchor`.
    pub fn local_of(&self, anchor: IVec3, world_pos: IVec3) -> IVec3 {
        world_pos - anchor - self.offset
    }

    /// World position of local cell `local` for a blueprint placed at
    /// `anchor`.
    pub fn world_of(&self, anchor: IVec3, local: IVec3) -> IVec3 {
        anchor + self.offset + local
    }

    /// World-space centre of the blueprint when placed at `anchor`.
    pub fn center(&self, anchor: IVec3) -> DVec3 {
        (anchor + self.offset).as_dvec3() + self.size.as_dvec3() * 0.5
    }

    fn index_of(&self, pos: IVec3) -> usize {
        index_of(pos, self.size)
    }
}

/// Converts a local position to a flat index (z varies fastest).
pub(crate) fn index_of(pos: IVec3, size: IVec3) -> usize {
    debug_assert!(
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(size).all(),
        "position {pos} outside blueprint of size {size}"
    );
    ((pos.x * size.y + pos.y) * size.z + pos.z) as usize
}

/// Inverse of [`index_of`].
pub(crate) fn pos_of(index: usize, size: IVec3) -> IVec3 {
    let index = index as i32;
    let z = index % size.z;
    let y = (index / size.z) % size.y;
    let x = index / (size.z * size.y);
    IVec3::new(x, y, z)
}

/// Number of cells in a blueprint of `size`.
pub(crate) fn checked_volume(size: IVec3) -> Result<usize, MalformedInputError> {
    if size.cmple(IVec3::ZERO).any() {
        return Err(MalformedInputError::NonPositiveSize(size));
    }
    (size.x as usize)
        .checked_mul(size.y as usize)
        .and_then(|v| v.checked_mul(size.z as usize))
        .filter(|&v| v <= i32::MAX as usize)
        .ok_or(MalformedInputError::NonPositiveSize(size))
}

/// Last position of the region `[origin, origin + size)`, if representable.
fn far_corner(origin: IVec3, size: IVec3) -> Result<IVec3, WorldAccessError> {
    let corner = |o: i32, s: i32| o.checked_add(s - 1);
    match (
        corner(origin.x, size.x),
        corner(origin.y, size.y),
        corner(origin.z, size.z),
    ) {
        (Some(x), Some(y), Some(z)) => Ok(IVec3::new(x, y, z)),
        _ => Err(WorldAccessError::Rejected {
            pos: origin,
            reason: format!("region of size {size} overflows world coordinates"),
        }),
    }
}

fn dim(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
