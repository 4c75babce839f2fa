use std::collections::HashSet;

use super::PriorityQueue;
use crate::world::coord::Coord3;

/// Priority queue of chunk coordinates that never holds the same coordinate
/// twice.
#[derive(Default)]
pub struct WorkScheduler {
    queue: PriorityQueue<Coord3>,
    queued: HashSet<Coord3>,
}

impl WorkScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, coord: Coord3) -> bool {
        self.queued.contains(&coord)
    }

    /// Returns false if the coordinate was already queued.
    pub fn enqueue(&mut self, coord: Coord3, priority: i32) -> bool {
        if self.queued.insert(coord) {
            self.queue.enqueue(coord, priority);
            true
        } else {
            false
        }
    }

    /// Nearest queued coordinate, or `None` once drained.
    pub fn dequeue(&mut self) -> Option<Coord3> {
        if self.queue.is_empty() {
            return None;
        }

        let coord = self.queue.dequeue()?;
        self.queued.remove(&coord);

        Some(coord)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.queued.clear();
    }
}
