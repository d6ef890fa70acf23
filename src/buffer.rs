//! Fixed-capacity circular byte store.
//!
//! Sits between a transport and the parser: a receive interrupt (or a USB
//! packet unpacker, see [`crate::packet`]) writes, the polling loop reads.
//! Writing to a full buffer evicts the oldest unread byte - it never blocks
//! and never grows. Single producer, single consumer; preemptive or
//! multi-core callers must add their own synchronization.

/// Circular buffer over `N` bytes with overwrite-oldest overflow semantics.
pub struct RingBuffer<const N: usize> {
    data: [u8; N],
    read: usize,
    write: usize,
    len: usize,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        RingBuffer {
            data: [0; N],
            read: 0,
            write: 0,
            len: 0,
        }
    }

    /// Number of unread bytes, always in `[0, N]`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store one byte, evicting the oldest unread byte when full.
    pub fn write(&mut self, byte: u8) {
        self.data[self.write] = byte;
        self.write = (self.write + 1) % N;
        if self.len == N {
            // full: the write head just ran over the oldest byte
            self.read = self.write;
        } else {
            self.len += 1;
        }
    }

    pub fn write_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write(byte);
        }
    }

    /// Pop the oldest byte. Returns 0 when empty - check [`Self::len`]
    /// first for a meaningful result.
    pub fn read(&mut self) -> u8 {
        if self.len == 0 {
            return 0;
        }
        let byte = self.data[self.read];
        self.read = (self.read + 1) % N;
        self.len -= 1;
        byte
    }

    /// Look at the unread byte `offset` positions past the read head
    /// without consuming it.
    pub fn peek(&self, offset: usize) -> u8 {
        if offset >= self.len {
            return 0;
        }
        self.data[(self.read + offset) % N]
    }

    /// Discard up to `count` unread bytes.
    pub fn pop(&mut self, count: usize) {
        let count = count.min(self.len);
        self.read = (self.read + count) % N;
        self.len -= count;
    }

    /// Zero the storage and reset both cursors.
    pub fn clear(&mut self) {
        self.data = [0; N];
        self.read = 0;
        self.write = 0;
        self.len = 0;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = RingBuffer::<4>::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_write_then_read_in_order() {
        let mut buffer = RingBuffer::<4>::new();
        buffer.write_slice(&[1, 2, 3]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.read(), 1);
        assert_eq!(buffer.read(), 2);
        assert_eq!(buffer.read(), 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_read_empty_returns_zero() {
        let mut buffer = RingBuffer::<4>::new();
        assert_eq!(buffer.read(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_overflow_keeps_most_recent_in_order() {
        let mut buffer = RingBuffer::<4>::new();
        // capacity + 3 writes
        buffer.write_slice(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.read(), 4);
        assert_eq!(buffer.read(), 5);
        assert_eq!(buffer.read(), 6);
        assert_eq!(buffer.read(), 7);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_is_empty_iff_len_zero() {
        let mut buffer = RingBuffer::<2>::new();
        assert_eq!(buffer.is_empty(), buffer.len() == 0);
        buffer.write(9);
        assert_eq!(buffer.is_empty(), buffer.len() == 0);
        buffer.read();
        assert_eq!(buffer.is_empty(), buffer.len() == 0);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buffer = RingBuffer::<4>::new();
        buffer.write_slice(&[0xf0, 0x42, 0xf7]);
        assert_eq!(buffer.peek(0), 0xf0);
        assert_eq!(buffer.peek(1), 0x42);
        assert_eq!(buffer.peek(2), 0xf7);
        assert_eq!(buffer.peek(3), 0);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_pop_discards() {
        let mut buffer = RingBuffer::<4>::new();
        buffer.write_slice(&[1, 2, 3]);
        buffer.pop(2);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.read(), 3);
        buffer.pop(10); // over-popping empties, does not underflow
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_resets_cursors() {
        let mut buffer = RingBuffer::<4>::new();
        buffer.write_slice(&[1, 2, 3, 4, 5]);
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.write(8);
        assert_eq!(buffer.read(), 8);
    }

    #[test]
    fn test_wrap_around_many_times() {
        let mut buffer = RingBuffer::<3>::new();
        for round in 0..100u32 {
            let byte = (round % 251) as u8;
            buffer.write(byte);
            assert_eq!(buffer.read(), byte);
        }
        assert!(buffer.is_empty());
    }
}
