use std::sync::Arc;

use super::{is_local, local_index, Chunk, CHUNK_SIZE_CUBED, CHUNK_SIZE_MASK};
use crate::world::{
    block::Cell,
    direction::{Face, FaceMask},
};

/// A chunk's cells together with its six face neighbors' cells, indexed by
/// `Face` ordinal. An absent neighbor is treated as an exposed boundary.
#[derive(Clone, Copy)]
pub struct ChunkNeighborhood<'a> {
    center: &'a [Cell],
    neighbors: [Option<&'a [Cell]>; 6],
    inactive_count: usize,
}

impl<'a> ChunkNeighborhood<'a> {
    pub fn new(center: &'a [Cell], neighbors: [Option<&'a [Cell]>; 6]) -> Self {
        debug_assert_eq!(center.len(), CHUNK_SIZE_CUBED);

        Self {
            center,
            neighbors,
            inactive_count: center.iter().filter(|cell| !cell.is_active()).count(),
        }
    }

    pub fn from_chunk(center: &'a Chunk, neighbors: [Option<&'a Chunk>; 6]) -> Self {
        Self {
            center: center.cells(),
            neighbors: neighbors.map(|neighbor| neighbor.map(Chunk::cells)),
            inactive_count: center.inactive_count(),
        }
    }

    /// A chunk with no known neighbors; every boundary face is exposed.
    pub fn isolated(center: &'a Chunk) -> Self {
        Self::from_chunk(center, [None; 6])
    }

    pub fn center(&self) -> &'a [Cell] {
        self.center
    }

    pub fn neighbor(&self, face: Face) -> Option<&'a [Cell]> {
        self.neighbors[face.index()]
    }

    pub fn is_any_active(&self) -> bool {
        self.inactive_count < CHUNK_SIZE_CUBED
    }

    pub fn is_any_inactive(&self) -> bool {
        self.inactive_count > 0
    }

    pub fn cell(&self, x: i32, y: i32, z: i32) -> Cell {
        self.center[local_index(x, y, z)]
    }

    /// Whether the cell adjacent to `(x, y, z)` across `face` is solid.
    /// Crossing the chunk boundary reads the neighbor chunk at the mirrored
    /// position on its near face; `None` means that neighbor is absent.
    pub fn faced_cell_active(&self, x: i32, y: i32, z: i32, face: Face) -> Option<bool> {
        let offset = face.offset();
        let (fx, fy, fz) = (x + offset.x, y + offset.y, z + offset.z);

        if is_local(fx, fy, fz) {
            Some(self.center[local_index(fx, fy, fz)].is_active())
        } else {
            self.neighbors[face.index()].map(|neighbor| {
                neighbor[local_index(
                    fx & CHUNK_SIZE_MASK,
                    fy & CHUNK_SIZE_MASK,
                    fz & CHUNK_SIZE_MASK,
                )]
                .is_active()
            })
        }
    }

    /// Faces of the cell at `(x, y, z)` that border inactive or unknown space.
    /// Inactive cells expose nothing.
    pub fn exposed_faces(&self, x: i32, y: i32, z: i32) -> FaceMask {
        let mut exposed = FaceMask::empty();

        if !self.cell(x, y, z).is_active() {
            return exposed;
        }

        for face in Face::ALL {
            if !self.faced_cell_active(x, y, z, face).unwrap_or(false) {
                exposed |= face.mask();
            }
        }

        exposed
    }
}

/// Owned counterpart of `ChunkNeighborhood`, safe to move onto a worker thread.
#[derive(Clone)]
pub struct NeighborhoodSnapshot {
    center: Arc<[Cell]>,
    neighbors: [Option<Arc<[Cell]>>; 6],
    inactive_count: usize,
}

impl NeighborhoodSnapshot {
    pub fn capture(center: &Chunk, neighbors: [Option<&Chunk>; 6]) -> Self {
        Self {
            center: center.snapshot(),
            neighbors: neighbors.map(|neighbor| neighbor.map(Chunk::snapshot)),
            inactive_count: center.inactive_count(),
        }
    }

    pub fn view(&self) -> ChunkNeighborhood<'_> {
        ChunkNeighborhood {
            center: &self.center,
            neighbors: std::array::from_fn(|index| self.neighbors[index].as_deref()),
            inactive_count: self.inactive_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::ChunkPool, world::coord::Coord3};

    #[test]
    fn lone_cell_exposes_every_face() {
        let pool = ChunkPool::new(1);
        let mut chunk = Chunk::new(Coord3::ZERO, &pool);
        chunk.set_cell_active(4, 4, 4, true);

        let neighborhood = ChunkNeighborhood::isolated(&chunk);
        assert_eq!(neighborhood.exposed_faces(4, 4, 4), FaceMask::all());
        assert_eq!(neighborhood.exposed_faces(5, 4, 4), FaceMask::empty());
    }

    #[test]
    fn boundary_reads_mirrored_neighbor_cell() {
        let pool = ChunkPool::new(2);
        let mut center = Chunk::new(Coord3::ZERO, &pool);
        let mut east = Chunk::new(Coord3::new(1, 0, 0), &pool);
        center.set_cell_active(15, 2, 3, true);
        east.set_cell_active(0, 2, 3, true);

        let mut neighbors = [None; 6];
        neighbors[Face::East.index()] = Some(&east);
        let neighborhood = ChunkNeighborhood::from_chunk(&center, neighbors);

        assert_eq!(neighborhood.faced_cell_active(15, 2, 3, Face::East), Some(true));
        assert_eq!(neighborhood.faced_cell_active(0, 2, 3, Face::West), None);
        assert!(!neighborhood.exposed_faces(15, 2, 3).contains(FaceMask::EAST));
        assert!(neighborhood.exposed_faces(15, 2, 3).contains(FaceMask::WEST));
    }

    #[test]
    fn snapshot_view_matches_live_chunk() {
        let pool = ChunkPool::new(2);
        let mut center = Chunk::new(Coord3::ZERO, &pool);
        let mut down = Chunk::new(Coord3::new(0, -1, 0), &pool);
        center.set_cell_active(7, 0, 7, true);
        down.fill(Cell::solid(2));

        let mut neighbors = [None; 6];
        neighbors[Face::Down.index()] = Some(&down);
        let snapshot = NeighborhoodSnapshot::capture(&center, neighbors);
        let live = ChunkNeighborhood::from_chunk(&center, neighbors);

        assert_eq!(
            snapshot.view().exposed_faces(7, 0, 7),
            live.exposed_faces(7, 0, 7)
        );
        assert!(!snapshot.view().exposed_faces(7, 0, 7).contains(FaceMask::DOWN));
        assert_eq!(snapshot.view().is_any_inactive(), live.is_any_inactive());
    }
}
