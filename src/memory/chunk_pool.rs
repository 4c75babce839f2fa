use std::{
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::world::{block::Cell, chunk::CHUNK_SIZE_CUBED};

/// Fixed-capacity arena of equally sized voxel buffers.
///
/// Buffers are allocated lazily until `capacity` is reached, and are recycled
/// from then on. A rented buffer is exclusively owned by its `PooledCells`
/// until that is dropped, at which point it is checked back in.
pub struct ChunkPool {
    capacity: usize,
    free: Mutex<Vec<Box<[Cell]>>>,
    allocated: AtomicUsize,
    rented: AtomicUsize,
}

impl ChunkPool {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity,
            free: Mutex::new(Vec::with_capacity(capacity)),
            allocated: AtomicUsize::new(0),
            rented: AtomicUsize::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rented_buffers(&self) -> usize {
        self.rented.load(Ordering::Acquire)
    }

    pub fn remaining_buffers(&self) -> usize {
        self.capacity - self.rented_buffers()
    }

    /// Rents a zeroed buffer of `CHUNK_SIZE_CUBED` cells, or `None` if every
    /// buffer in the pool is currently checked out.
    pub fn rent(self: &Arc<Self>) -> Option<PooledCells> {
        let mut free = self
            .free
            .lock()
            .expect("Chunk pool free list mutex has been poisoned!");

        let cells = match free.pop() {
            Some(mut cells) => {
                cells.fill(Cell::EMPTY);
                cells
            }

            None if self.allocated.load(Ordering::Acquire) < self.capacity => {
                let allocated = self.allocated.fetch_add(1, Ordering::AcqRel) + 1;
                trace!("Chunk pool allocated buffer {}/{}.", allocated, self.capacity);

                vec![Cell::EMPTY; CHUNK_SIZE_CUBED].into_boxed_slice()
            }

            None => return None,
        };

        self.rented.fetch_add(1, Ordering::AcqRel);

        Some(PooledCells {
            cells,
            pool: Arc::clone(self),
        })
    }

    fn check_in(&self, cells: Box<[Cell]>) {
        debug_assert_eq!(cells.len(), CHUNK_SIZE_CUBED);

        self.free
            .lock()
            .expect("Chunk pool free list mutex has been poisoned!")
            .push(cells);
        self.rented.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Voxel storage checked out of a `ChunkPool`; returned to it on drop.
pub struct PooledCells {
    cells: Box<[Cell]>,
    pool: Arc<ChunkPool>,
}

impl Deref for PooledCells {
    type Target = [Cell];

    fn deref(&self) -> &[Cell] {
        &self.cells
    }
}

impl DerefMut for PooledCells {
    fn deref_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

impl Drop for PooledCells {
    fn drop(&mut self) {
        self.pool.check_in(std::mem::take(&mut self.cells));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rent_until_exhausted() {
        let pool = ChunkPool::new(2);

        let first = pool.rent();
        let second = pool.rent();
        assert!(first.is_some() && second.is_some());
        assert!(pool.rent().is_none());
        assert_eq!(pool.remaining_buffers(), 0);

        drop(first);
        assert_eq!(pool.remaining_buffers(), 1);
        assert!(pool.rent().is_some());
    }

    #[test]
    fn recycled_buffers_are_zeroed() {
        let pool = ChunkPool::new(1);

        let mut cells = pool.rent().unwrap();
        assert_eq!(cells.len(), CHUNK_SIZE_CUBED);
        cells[7] = Cell::solid(3);
        drop(cells);

        let cells = pool.rent().unwrap();
        assert!(cells.iter().all(|cell| *cell == Cell::EMPTY));
    }
}
