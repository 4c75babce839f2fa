use glam::Vec3;

pub mod block;
pub mod chunk;
pub mod coord;
pub mod direction;
pub mod generation;

mod edit;
mod streaming;

pub use streaming::*;

use chunk::{CHUNK_SIZE, CHUNK_SIZE_MASK, CHUNK_SIZE_SHIFT};
use coord::Coord3;

/// Chunk containing a world-space position.
pub fn world_to_chunk(position: Vec3) -> Coord3 {
    block_to_chunk(world_to_block(position)).0
}

/// Block containing a world-space position.
pub fn world_to_block(position: Vec3) -> Coord3 {
    let floored = position.floor();
    Coord3::new(floored.x as i32, floored.y as i32, floored.z as i32)
}

/// World-space position of a block's minimum corner.
pub fn block_to_world(block: Coord3) -> Vec3 {
    block.as_vec3()
}

/// Splits a block coordinate into its chunk and the chunk-local position.
pub fn block_to_chunk(block: Coord3) -> (Coord3, Coord3) {
    (
        Coord3::new(
            block.x >> CHUNK_SIZE_SHIFT,
            block.y >> CHUNK_SIZE_SHIFT,
            block.z >> CHUNK_SIZE_SHIFT,
        ),
        Coord3::new(
            block.x & CHUNK_SIZE_MASK,
            block.y & CHUNK_SIZE_MASK,
            block.z & CHUNK_SIZE_MASK,
        ),
    )
}

pub fn chunk_to_block(chunk: Coord3, local: Coord3) -> Coord3 {
    (chunk * CHUNK_SIZE) + local
}
