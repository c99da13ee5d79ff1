//! Fixed-capacity pool of exclusive detail slots.
//!
//! A slot stands for one entry in a backing resource (typically a layer of a
//! texture array). Every current leaf holds exactly one slot; the pool hands
//! them out in first-released, first-reused order.

use std::collections::VecDeque;
use std::fmt;

use crate::LodError;

/// Identifier of one detail slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl SlotId {
    /// The slot as a plain index, e.g. a texture array layer.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// FIFO pool of interchangeable [`SlotId`]s.
#[derive(Clone, Debug)]
pub struct SlotPool {
    capacity: u32,
    available: VecDeque<SlotId>,
    /// `is_free[i]` mirrors membership of `SlotId(i)` in `available`.
    is_free: Vec<bool>,
}

impl SlotPool {
    /// Create a pool holding the slots `0..capacity`, all free.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            available: (0..capacity).map(SlotId).collect(),
            is_free: vec![true; capacity as usize],
        }
    }

    /// Take the slot that has been free the longest.
    pub fn acquire(&mut self) -> Result<SlotId, LodError> {
        let slot = self.available.pop_front().ok_or(LodError::PoolExhausted {
            capacity: self.capacity,
        })?;
        self.is_free[slot.index()] = false;
        Ok(slot)
    }

    /// Return a node's slot to the pool. `None` (a node without a slot) is ignored.
    pub fn release(&mut self, slot: Option<SlotId>) {
        let Some(slot) = slot else {
            return;
        };
        if self.is_free.get(slot.index()) != Some(&false) {
            tracing::error!(%slot, capacity = self.capacity, "released a slot the pool does not own");
            debug_assert!(false, "slot {slot} released twice or out of range");
            return;
        }
        self.is_free[slot.index()] = true;
        self.available.push_back(slot);
    }

    /// Number of free slots.
    #[must_use]
    pub fn available(&self) -> u32 {
        self.available.len() as u32
    }

    /// Number of slots currently handed out.
    #[must_use]
    pub fn in_use(&self) -> u32 {
        self.capacity - self.available()
    }

    /// Total number of slots, free or assigned.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub fn is_free(&self, slot: SlotId) -> bool {
        self.is_free.get(slot.index()).copied().unwrap_or(false)
    }

    /// Free slots in the order they will be handed out.
    pub fn free_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.available.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pool_is_fully_available() {
        let pool = SlotPool::new(4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.available(), 4);
        assert_eq!(pool.in_use(), 0);
        let free: Vec<_> = pool.free_slots().collect();
        assert_eq!(free, vec![SlotId(0), SlotId(1), SlotId(2), SlotId(3)]);
    }

    /// Slots come back out in the order they were released.
    #[test]
    fn test_acquire_is_fifo() {
        let mut pool = SlotPool::new(3);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!((a, b), (SlotId(0), SlotId(1)));

        pool.release(Some(b));
        pool.release(Some(a));
        assert_eq!(pool.acquire().unwrap(), SlotId(2));
        assert_eq!(pool.acquire().unwrap(), SlotId(1));
        assert_eq!(pool.acquire().unwrap(), SlotId(0));
    }

    #[test]
    fn test_exhausted_pool_errors() {
        let mut pool = SlotPool::new(1);
        pool.acquire().unwrap();
        assert_eq!(pool.acquire(), Err(LodError::PoolExhausted { capacity: 1 }));
        assert_eq!(pool.in_use(), 1);
    }

    #[test]
    fn test_release_none_is_noop() {
        let mut pool = SlotPool::new(2);
        pool.acquire().unwrap();
        pool.release(None);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_free_tracking_follows_acquire_and_release() {
        let mut pool = SlotPool::new(10_000);
        let taken: Vec<_> = (0..5_000).map(|_| pool.acquire().unwrap()).collect();
        assert!(!pool.is_free(SlotId(0)));
        assert!(pool.is_free(SlotId(5_000)));
        for slot in taken.into_iter().rev() {
            pool.release(Some(slot));
        }
        assert_eq!(pool.available(), 10_000);
        assert!(pool.is_free(SlotId(0)));
        assert!(!pool.is_free(SlotId(10_000)));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "released twice or out of range")]
    fn test_double_release_is_caught() {
        let mut pool = SlotPool::new(2);
        let slot = pool.acquire().unwrap();
        pool.release(Some(slot));
        pool.release(Some(slot));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "released twice or out of range")]
    fn test_out_of_range_release_is_caught() {
        let mut pool = SlotPool::new(2);
        pool.release(Some(SlotId(2)));
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(SlotId(7).to_string(), "#7");
        assert_eq!(SlotId(7).index(), 7);
    }
}
