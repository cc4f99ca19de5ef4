//! Quarter-turn rotation and mirroring of a whole blueprint.
//!
//! Both operations build a complete replacement grid first and only then
//! swap it (and the size) into the blueprint, so a blueprint is never
//! observed half-transformed. Every populated source cell lands on exactly
//! one destination cell.

use glam::IVec3;

use crate::blueprint::{Blueprint, index_of, pos_of};
use crate::orientation::{Axis, Rotation, closest_inside, rotate_pos};
use crate::schematic::Schematic;

impl Blueprint {
    /// Rotates the blueprint about `axis`.
    ///
    /// Extents on the two axes perpendicular to `axis` swap for quarter
    /// turns. Each schematic has its own orientation updated, entities are
    /// rotated against the old size, and the offset is re-anchored so the
    /// rotation pivots on the placement anchor.
    pub fn rotate(&mut self, axis: Axis, rotation: Rotation) {
        let old_size = self.size;
        let new_size = rotate_pos(old_size, axis, rotation).abs();

        // Rotated indices can be negative; shift the rotated box back onto
        // the non-negative index range.
        let new_max = rotate_pos(old_size - IVec3::ONE, axis, rotation);
        let array_offset = closest_inside(new_max, IVec3::ZERO, new_size - IVec3::ONE) - new_max;

        let mut new_cells: Vec<Option<Schematic>> = vec![None; self.cells.len()];
        for (index, cell) in self.cells.iter_mut().enumerate() {
            let Some(mut schematic) = cell.take() else {
                continue;
            };
            schematic.rotate(axis, rotation);
            let rotated = rotate_pos(pos_of(index, old_size), axis, rotation) + array_offset;
            let slot = &mut new_cells[index_of(rotated, new_size)];
            debug_assert!(slot.is_none(), "rotation mapped two cells onto {rotated}");
            *slot = Some(schematic);
        }

        self.cells = new_cells;
        self.size = new_size;
        self.offset = rotate_pos(self.offset, axis, rotation) - array_offset;

        for entity in &mut self.entities {
            entity.rotate(axis, rotation, old_size);
        }

        tracing::debug!(
            "rotated blueprint {:?} about {:?}: {} -> {}",
            rotation,
            axis,
            old_size,
            new_size
        );
    }

    /// Mirrors the blueprint along `axis`. The size never changes.
    pub fn mirror(&mut self, axis: Axis) {
        let size = self.size;
        let extent = axis.component(size);

        let mut new_cells: Vec<Option<Schematic>> = vec![None; self.cells.len()];
        for (index, cell) in self.cells.iter_mut().enumerate() {
            let Some(mut schematic) = cell.take() else {
                continue;
            };
            schematic.mirror(axis);
            let pos = pos_of(index, size);
            let mirrored = axis.with_component(pos, extent - 1 - axis.component(pos));
            let slot = &mut new_cells[index_of(mirrored, size)];
            debug_assert!(slot.is_none(), "mirror mapped two cells onto {mirrored}");
            *slot = Some(schematic);
        }

        self.cells = new_cells;
        self.offset = axis.with_component(
            self.offset,
            -axis.component(self.offset) - (extent - 1),
        );

        for entity in &mut self.entities {
            entity.mirror(axis, size);
        }

        tracing::debug!("mirrored blueprint along {:?}", axis);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
