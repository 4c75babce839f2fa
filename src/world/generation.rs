use std::sync::Arc;

use super::{
    block::Cell,
    chunk::{Chunk, CHUNK_SIZE},
    coord::Coord3,
};
use crate::memory::ChunkPool;

/// Source of terrain. Runs on background workers, so it must be a pure,
/// deterministic function of the coordinate.
pub trait TerrainGenerator: Send + Sync {
    fn generate(&self, coord: Coord3, pool: &Arc<ChunkPool>) -> Chunk;
}

/// Everything below `ground_height` (in blocks) is solid.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub ground_height: i32,
    pub material: u8,
}

impl TerrainGenerator for FlatTerrain {
    fn generate(&self, coord: Coord3, pool: &Arc<ChunkPool>) -> Chunk {
        let mut chunk = Chunk::new(coord, pool);
        let base_y = coord.y * CHUNK_SIZE;

        if base_y + CHUNK_SIZE <= self.ground_height {
            chunk.fill(Cell::solid(self.material));
        } else if base_y < self.ground_height {
            for z in 0..CHUNK_SIZE {
                for y in 0..(self.ground_height - base_y) {
                    for x in 0..CHUNK_SIZE {
                        chunk.set_cell_type(x, y, z, self.material);
                        chunk.set_cell_active(x, y, z, true);
                    }
                }
            }
        }

        chunk
    }
}
