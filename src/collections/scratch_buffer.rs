/// Oversized, reusable output buffer.
///
/// Only the first `len()` elements are valid. Capacity doubles when a push
/// would overflow and is never released, so repeated rebuilds settle at the
/// high-water mark and stop allocating.
pub struct ScratchBuffer<T> {
    data: Vec<T>,
    used: usize,
}

impl<T: Copy + Default> ScratchBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![T::default(); capacity.max(1)],
            used: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Marks the buffer empty without touching the backing storage.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn push(&mut self, value: T) {
        if self.used == self.data.len() {
            let doubled = self.data.len() * 2;
            self.data.resize(doubled, T::default());
        }

        self.data[self.used] = value;
        self.used += 1;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.used]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_doubling_and_never_shrinks() {
        let mut buffer = ScratchBuffer::<u32>::with_capacity(4);

        for value in 0..5 {
            buffer.push(value);
        }
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.as_slice(), &[0, 1, 2, 3, 4]);

        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 8);

        buffer.push(9);
        assert_eq!(buffer.as_slice(), &[9]);
    }
}
