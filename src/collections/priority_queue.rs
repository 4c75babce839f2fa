/// Binary min-heap of `(item, priority)` pairs.
///
/// Equal priorities dequeue in no particular order.
pub struct PriorityQueue<T> {
    heap: Vec<(T, i32)>,
}

impl<T> PriorityQueue<T> {
    pub const fn new() -> Self {
        Self { heap: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn enqueue(&mut self, item: T, priority: i32) {
        self.heap.push((item, priority));
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the item with the lowest priority.
    ///
    /// Dequeueing an empty queue is a caller error. Debug builds assert;
    /// release builds return `None`.
    pub fn dequeue(&mut self) -> Option<T> {
        self.dequeue_with_priority().map(|(item, _)| item)
    }

    pub fn dequeue_with_priority(&mut self) -> Option<(T, i32)> {
        debug_assert!(!self.heap.is_empty(), "dequeue on empty priority queue");

        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let min = self.heap.pop();

        if !self.heap.is_empty() {
            self.sift_down(0);
        }

        min
    }

    pub fn peek_priority(&self) -> Option<i32> {
        self.heap.first().map(|(_, priority)| *priority)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;

            if self.heap[index].1 >= self.heap[parent].1 {
                break;
            }

            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();

        loop {
            let left = (index * 2) + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }

            if right < len && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }

            if smallest == index {
                break;
            }

            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T: PartialEq> PriorityQueue<T> {
    /// Linear scan; the queues this backs stay small.
    pub fn contains(&self, item: &T) -> bool {
        self.heap.iter().any(|(queued, _)| queued == item)
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
