use glam::Vec3;
use std::collections::HashSet;

use super::{
    block::Cell,
    block_to_chunk,
    chunk::{is_local, Chunk},
    coord::Coord3,
    streaming::World,
    world_to_block, world_to_chunk,
};
use crate::{physics::Physics, render::Renderer};

impl<R: Renderer, P: Physics> World<R, P> {
    pub fn chunk(&self, coord: Coord3) -> Option<&Chunk> {
        self.chunks.get(&coord).map(|record| &record.chunk)
    }

    pub fn chunk_at_world(&self, position: Vec3) -> Option<&Chunk> {
        self.chunk(world_to_chunk(position))
    }

    pub fn chunk_offset(&self, coord: Coord3, offset: Coord3) -> Option<&Chunk> {
        self.chunk(coord + offset)
    }

    pub fn cell_at_block(&self, block: Coord3) -> Option<Cell> {
        let (chunk, local) = block_to_chunk(block);
        self.chunk(chunk)
            .map(|chunk| chunk.cell(local.x, local.y, local.z))
    }

    pub fn cell_at_world(&self, position: Vec3) -> Option<Cell> {
        self.cell_at_block(world_to_block(position))
    }

    /// Overwrites one block and queues the affected chunks for refresh.
    /// Returns false if the block's chunk isn't loaded.
    pub fn set_block(&mut self, block: Coord3, cell: Cell) -> bool {
        let (chunk_coord, local) = block_to_chunk(block);

        let Some(record) = self.chunks.get_mut(&chunk_coord) else {
            return false;
        };

        record.chunk.set_cell_type(local.x, local.y, local.z, cell.material());
        record
            .chunk
            .set_cell_active(local.x, local.y, local.z, cell.is_active());

        let mut touched = HashSet::new();
        mark_touched(&mut touched, chunk_coord, local);
        self.refresh_touched(touched);

        true
    }

    pub fn set_block_at_world(&mut self, position: Vec3, cell: Cell) -> bool {
        self.set_block(world_to_block(position), cell)
    }

    /// Deactivates every loaded voxel whose center lies within `radius` of
    /// `center`, then queues each affected chunk for refresh once. Returns
    /// the number of voxels deactivated.
    pub fn destroy_sphere(&mut self, center: Vec3, radius: f32) -> usize {
        let min = world_to_block(center - Vec3::splat(radius));
        let max = world_to_block(center + Vec3::splat(radius));
        let mut touched = HashSet::new();
        let mut destroyed = 0;

        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    let block = Coord3::new(x, y, z);

                    if (block.as_vec3() + Vec3::splat(0.5)).distance(center) > radius {
                        continue;
                    }

                    let (chunk_coord, local) = block_to_chunk(block);
                    let Some(record) = self.chunks.get_mut(&chunk_coord) else {
                        continue;
                    };

                    if record.chunk.is_cell_active(local.x, local.y, local.z) {
                        record
                            .chunk
                            .set_cell_active(local.x, local.y, local.z, false);
                        mark_touched(&mut touched, chunk_coord, local);
                        destroyed += 1;
                    }
                }
            }
        }

        debug!(
            "Destroyed {} voxels around {} touching {} chunks.",
            destroyed,
            center,
            touched.len()
        );
        self.refresh_touched(touched);

        destroyed
    }

    fn refresh_touched(&mut self, touched: HashSet<Coord3>) {
        for coord in touched {
            self.enqueue_refresh(coord);
        }
    }
}

/// Records the chunk holding an edited voxel, plus every face neighbor whose
/// shared face the voxel sits on.
fn mark_touched(touched: &mut HashSet<Coord3>, chunk: Coord3, local: Coord3) {
    touched.insert(chunk);

    for offset in Coord3::FACE_OFFSETS {
        let faced = local + offset;

        if !is_local(faced.x, faced.y, faced.z) {
            touched.insert(chunk + offset);
        }
    }
}
