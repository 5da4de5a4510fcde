//! Fixed-capacity byte ring used by the serial controller.

/// Bounded circular byte buffer tracked by head index and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteFifo<const N: usize> {
    buf: [u8; N],
    head: usize,
    len: usize,
}

impl<const N: usize> Default for ByteFifo<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteFifo<N> {
    /// Number of bytes the ring can hold.
    pub const CAPACITY: usize = N;

    /// Creates an empty ring.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            len: 0,
        }
    }

    /// Returns the number of queued bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` when no more bytes fit.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns the free capacity.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        N - self.len
    }

    /// Appends a byte at the tail. Returns `false` when full.
    #[allow(clippy::missing_const_for_fn)]
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        let tail = (self.head + self.len) % N;
        self.buf[tail] = byte;
        self.len += 1;
        true
    }

    /// Removes the oldest byte.
    #[allow(clippy::missing_const_for_fn)]
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(byte)
    }

    /// Appends as many leading bytes of `bytes` as fit; returns how many.
    pub fn extend_from(&mut self, bytes: &[u8]) -> usize {
        let accepted = bytes.len().min(self.remaining());
        for &byte in &bytes[..accepted] {
            self.push(byte);
        }
        accepted
    }

    /// Drops every queued byte.
    #[allow(clippy::missing_const_for_fn)]
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::ByteFifo;
    use proptest::prelude::*;

    #[test]
    fn pops_in_push_order_across_wrap() {
        let mut fifo = ByteFifo::<4>::new();
        assert_eq!(fifo.extend_from(&[1, 2, 3]), 3);
        assert_eq!(fifo.pop(), Some(1));
        assert_eq!(fifo.pop(), Some(2));
        assert_eq!(fifo.extend_from(&[4, 5, 6]), 3);
        assert!(fifo.is_full());
        assert!(!fifo.push(7));

        let drained: Vec<u8> = std::iter::from_fn(|| fifo.pop()).collect();
        assert_eq!(drained, vec![3, 4, 5, 6]);
        assert!(fifo.is_empty());
        assert_eq!(fifo.pop(), None);
    }

    #[test]
    fn clear_empties_without_touching_capacity() {
        let mut fifo = ByteFifo::<16>::new();
        fifo.extend_from(b"hello");
        fifo.clear();
        assert_eq!(fifo.len(), 0);
        assert_eq!(fifo.remaining(), ByteFifo::<16>::CAPACITY);
    }

    proptest! {
        #[test]
        fn extend_clamps_to_free_space(
            first in proptest::collection::vec(any::<u8>(), 0..24),
            second in proptest::collection::vec(any::<u8>(), 0..24),
        ) {
            let mut fifo = ByteFifo::<16>::new();
            let a = fifo.extend_from(&first);
            let b = fifo.extend_from(&second);

            prop_assert_eq!(a, first.len().min(16));
            prop_assert_eq!(b, second.len().min(16 - a));
            prop_assert_eq!(fifo.len(), a + b);

            let expected: Vec<u8> = first[..a].iter().chain(&second[..b]).copied().collect();
            let drained: Vec<u8> = std::iter::from_fn(|| fifo.pop()).collect();
            prop_assert_eq!(drained, expected);
        }
    }
}
