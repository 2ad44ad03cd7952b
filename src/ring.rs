//! Fixed-capacity byte ring shared between one producer and one consumer.
//!
//! The producer only ever stores `head`, the consumer only ever stores
//! `tail`. Either side may load both. With that split no lock is needed;
//! the only requirement is that an 8-bit index load or store is a single
//! instruction, which holds on AVR.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

pub struct ByteRing<const N: usize> {
    data: UnsafeCell<[u8; N]>,
    head: AtomicU8,
    tail: AtomicU8,
}

// Sound as long as callers keep to one producer context and one consumer
// context per ring; `Device` is the only owner and encodes those roles.
unsafe impl<const N: usize> Sync for ByteRing<N> {}

impl<const N: usize> ByteRing<N> {
    const MASK: usize = N - 1;
    const CAPACITY_OK: () = assert!(
        N >= 2 && N <= 256 && N.is_power_of_two(),
        "ring capacity must be a power of two in 2..=256"
    );

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self {
            data: UnsafeCell::new([0; N]),
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
        }
    }

    #[inline]
    fn next(index: u8) -> u8 {
        ((index as usize + 1) & Self::MASK) as u8
    }

    /// Slots usable at once. One is sacrificed to tell full from empty.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Producer side. Returns `false` without touching anything when full.
    pub fn try_push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = Self::next(head);
        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }
        // The consumer never reads the slot at `head` until it sees the
        // new head below.
        unsafe { (*self.data.get())[head as usize] = byte };
        self.head.store(next, Ordering::Release);
        true
    }

    /// Consumer side.
    pub fn try_pop(&self) -> Option<u8> {
        let byte = self.peek()?;
        let tail = self.tail.load(Ordering::Relaxed);
        self.tail.store(Self::next(tail), Ordering::Release);
        Some(byte)
    }

    /// Consumer side. Oldest byte without removing it.
    pub fn peek(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        Some(unsafe { (*self.data.get())[tail as usize] })
    }

    /// Bytes stored, always in `0..N`.
    pub fn occupied(&self) -> usize {
        let head = self.head.load(Ordering::Acquire) as usize;
        let tail = self.tail.load(Ordering::Acquire) as usize;
        head.wrapping_sub(tail) & Self::MASK
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        Self::next(self.head.load(Ordering::Acquire)) == self.tail.load(Ordering::Acquire)
    }

    /// Current write index. Used to mark a frame boundary.
    pub fn head(&self) -> u8 {
        self.head.load(Ordering::Acquire)
    }

    /// Consumer side. Discards everything up to `end` (a value previously
    /// returned by [`head`](Self::head)) and returns how many bytes that was.
    pub fn release_to(&self, end: u8) -> usize {
        let tail = self.tail.load(Ordering::Relaxed) as usize;
        let count = (end as usize).wrapping_sub(tail) & Self::MASK;
        self.tail.store(end, Ordering::Release);
        count
    }
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ring = ByteRing::<8>::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.occupied(), 0);
        assert_eq!(ring.try_pop(), None);
        assert_eq!(ring.capacity(), 7);
    }

    #[test]
    fn fifo_order() {
        let ring = ByteRing::<8>::new();
        for b in b"abc" {
            assert!(ring.try_push(*b));
        }
        assert_eq!(ring.peek(), Some(b'a'));
        assert_eq!(ring.try_pop(), Some(b'a'));
        assert_eq!(ring.try_pop(), Some(b'b'));
        assert_eq!(ring.try_pop(), Some(b'c'));
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn full_ring_rejects_without_overwrite() {
        let ring = ByteRing::<4>::new();
        assert!(ring.try_push(1));
        assert!(ring.try_push(2));
        assert!(ring.try_push(3));
        assert!(ring.is_full());
        assert!(!ring.try_push(4));
        assert_eq!(ring.occupied(), 3);
        assert_eq!(ring.try_pop(), Some(1));
        assert_eq!(ring.try_pop(), Some(2));
        assert_eq!(ring.try_pop(), Some(3));
    }

    #[test]
    fn pop_then_push_on_full_ring_restores_full() {
        let ring = ByteRing::<16>::new();
        let mut value = 0u8;
        while ring.try_push(value) {
            value += 1;
        }
        assert_eq!(value, 15);
        assert_eq!(ring.try_pop(), Some(0));
        assert!(ring.try_push(15));
        assert!(ring.is_full());
        for expected in 1..=15 {
            assert_eq!(ring.try_pop(), Some(expected));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn occupied_tracks_pushes_minus_pops_across_wraparound() {
        let ring = ByteRing::<256>::new();
        let mut pushed = 0usize;
        let mut popped = 0usize;
        // Uneven push/pop batches walk the indices around several times.
        for round in 0..40usize {
            for i in 0..(round % 7 + 3) {
                if ring.try_push(i as u8) {
                    pushed += 1;
                }
            }
            for _ in 0..(round % 5 + 1) {
                if ring.try_pop().is_some() {
                    popped += 1;
                }
            }
            assert_eq!(ring.occupied(), (pushed - popped) % 256);
            assert!(ring.occupied() < 256);
        }
        for _ in 0..1000 {
            if ring.try_push(0xAA) {
                pushed += 1;
            }
            if ring.try_pop().is_some() {
                popped += 1;
            }
        }
        assert!(pushed > 256);
        assert_eq!(ring.occupied(), pushed - popped);
    }

    #[test]
    fn release_to_counts_with_wraparound() {
        let ring = ByteRing::<256>::new();
        for _ in 0..250 {
            assert!(ring.try_push(0));
        }
        ring.release_to(ring.head());
        for b in 0..20u8 {
            assert!(ring.try_push(b));
        }
        // head wrapped past zero while tail sits at 250
        assert!(ring.head() < 250);
        let end = ring.head();
        assert_eq!(ring.release_to(end), 20);
        assert!(ring.is_empty());
    }

    #[test]
    fn release_to_keeps_bytes_after_snapshot() {
        let ring = ByteRing::<8>::new();
        ring.try_push(1);
        ring.try_push(2);
        let end = ring.head();
        ring.try_push(3);
        assert_eq!(ring.release_to(end), 2);
        assert_eq!(ring.occupied(), 1);
        assert_eq!(ring.try_pop(), Some(3));
    }

    #[test]
    fn concurrent_producer_and_consumer_keep_order() {
        let ring = ByteRing::<32>::new();
        const TOTAL: usize = 20_000;
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..TOTAL {
                    while !ring.try_push(i as u8) {
                        std::hint::spin_loop();
                    }
                }
            });
            s.spawn(|| {
                for i in 0..TOTAL {
                    let byte = loop {
                        if let Some(b) = ring.try_pop() {
                            break b;
                        }
                        std::hint::spin_loop();
                    };
                    assert_eq!(byte, i as u8);
                    assert!(ring.occupied() < 32);
                }
            });
        });
        assert!(ring.is_empty());
    }
}
