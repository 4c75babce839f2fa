mod mesher;
mod neighborhood;

pub use mesher::*;
pub use neighborhood::*;

use glam::Vec3;
use std::sync::Arc;

use crate::memory::{ChunkPool, PooledCells};

use super::{block::Cell, coord::Coord3};

pub const CHUNK_SIZE: i32 = 16;
pub const CHUNK_SIZE_SQUARED: i32 = CHUNK_SIZE.pow(2);
pub const CHUNK_SIZE_CUBED: usize = CHUNK_SIZE.pow(3) as usize;
pub const CHUNK_SIZE_SHIFT: i32 = CHUNK_SIZE.trailing_zeros() as i32;
pub const CHUNK_SIZE_MASK: i32 = CHUNK_SIZE - 1;

/// Flat index of a chunk-local position, raster order x, then y, then z.
#[inline(always)]
pub const fn local_index(x: i32, y: i32, z: i32) -> usize {
    (x + (y * CHUNK_SIZE) + (z * CHUNK_SIZE_SQUARED)) as usize
}

#[inline(always)]
pub const fn is_local(x: i32, y: i32, z: i32) -> bool {
    (x | y | z) & !CHUNK_SIZE_MASK == 0
}

/// Fixed-size cube of voxels backed by storage rented from a `ChunkPool`.
///
/// Dropping the chunk returns its storage to the pool.
pub struct Chunk {
    coord: Coord3,
    world_position: Vec3,
    world_centroid: Vec3,
    cells: PooledCells,
    inactive_count: usize,
}

impl Chunk {
    /// Creates an empty chunk at the given chunk coordinate.
    ///
    /// Panics if the pool has no buffers left: the pool is sized from the load
    /// radius, so running dry is a configuration defect.
    pub fn new(coord: Coord3, pool: &Arc<ChunkPool>) -> Self {
        let cells = pool.rent().unwrap_or_else(|| {
            panic!(
                "Chunk pool exhausted ({} buffers) while allocating chunk {}",
                pool.capacity(),
                coord
            )
        });
        let world_position = coord.scale(Vec3::splat(CHUNK_SIZE as f32));

        Self {
            coord,
            world_position,
            world_centroid: world_position + Vec3::splat(CHUNK_SIZE as f32 / 2.0),
            cells,
            inactive_count: CHUNK_SIZE_CUBED,
        }
    }

    pub fn coord(&self) -> Coord3 {
        self.coord
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn world_centroid(&self) -> Vec3 {
        self.world_centroid
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: i32, y: i32, z: i32) -> Cell {
        debug_assert!(is_local(x, y, z), "cell ({}, {}, {}) out of range", x, y, z);
        self.cells[local_index(x, y, z)]
    }

    pub fn is_cell_active(&self, x: i32, y: i32, z: i32) -> bool {
        self.cell(x, y, z).is_active()
    }

    pub fn set_cell_active(&mut self, x: i32, y: i32, z: i32, active: bool) {
        debug_assert!(is_local(x, y, z), "cell ({}, {}, {}) out of range", x, y, z);
        let cell = &mut self.cells[local_index(x, y, z)];

        if cell.is_active() != active {
            cell.set_active(active);

            if active {
                self.inactive_count -= 1;
            } else {
                self.inactive_count += 1;
            }
        }
    }

    pub fn set_cell_type(&mut self, x: i32, y: i32, z: i32, material: u8) {
        debug_assert!(is_local(x, y, z), "cell ({}, {}, {}) out of range", x, y, z);
        self.cells[local_index(x, y, z)].set_material(material);
    }

    /// Overwrites every cell.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
        self.inactive_count = if cell.is_active() {
            0
        } else {
            CHUNK_SIZE_CUBED
        };
    }

    pub fn inactive_count(&self) -> usize {
        self.inactive_count
    }

    pub fn is_any_active(&self) -> bool {
        self.inactive_count < CHUNK_SIZE_CUBED
    }

    pub fn is_any_inactive(&self) -> bool {
        self.inactive_count > 0
    }

    /// Immutable copy of the cells, for readers on other threads.
    pub fn snapshot(&self) -> Arc<[Cell]> {
        Arc::from(self.cells())
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("inactive_count", &self.inactive_count)
            .finish()
    }
}
