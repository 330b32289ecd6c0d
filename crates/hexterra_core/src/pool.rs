//! # Chunk Pool
//!
//! Recycles chunk slots so streaming in and out of the render window does
//! not allocate a fresh cell array per chunk.
//!
//! Slots are never shrunk. A released slot keeps its cell allocation and is
//! handed out again, reset in place, by the next [`ChunkPool::acquire`].

use crate::chunk::{Chunk, ChunkCoord, ChunkDims};

/// Handle to a chunk slot in a [`ChunkPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkHandle {
    index: usize,
}

impl ChunkHandle {
    /// Slot index inside the pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// Growable pool of chunk slots.
///
/// # Thread Safety
///
/// Not thread-safe. The owner (usually the world streamer) serializes access.
#[derive(Debug)]
pub struct ChunkPool {
    dims: ChunkDims,
    /// Slot storage. `live[i]` tells whether `slots[i]` is handed out.
    slots: Vec<Chunk>,
    live: Vec<bool>,
    /// Indices of released slots, reused LIFO.
    free_list: Vec<usize>,
}

impl ChunkPool {
    /// Creates an empty pool for chunks of the given size.
    #[must_use]
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            slots: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Creates a pool with `count` pre-allocated slots.
    #[must_use]
    pub fn with_capacity(dims: ChunkDims, count: usize) -> Self {
        let mut pool = Self::new(dims);
        pool.slots.reserve(count);
        pool.live.reserve(count);
        for index in 0..count {
            pool.slots.push(Chunk::new(ChunkCoord::default(), dims));
            pool.live.push(false);
            pool.free_list.push(count - 1 - index);
        }
        pool
    }

    /// Chunk dimensions of every slot.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Hands out a slot for `coord`, reusing a released one if available.
    ///
    /// The returned chunk is unloaded with all-air cells.
    pub fn acquire(&mut self, coord: ChunkCoord) -> ChunkHandle {
        if let Some(index) = self.free_list.pop() {
            debug_assert!(!self.live[index], "free list holds a live slot");
            let chunk = &mut self.slots[index];
            chunk.reset(coord);
            debug_assert_eq!(chunk.volume().dims(), self.dims);
            self.live[index] = true;
            return ChunkHandle { index };
        }

        let index = self.slots.len();
        self.slots.push(Chunk::new(coord, self.dims));
        self.live.push(true);
        ChunkHandle { index }
    }

    /// Returns a slot to the pool, clearing its cells and dropping its mesh.
    ///
    /// Returns false if the handle was not live.
    pub fn release(&mut self, handle: ChunkHandle) -> bool {
        match self.live.get_mut(handle.index) {
            Some(live) if *live => {
                *live = false;
                let chunk = &mut self.slots[handle.index];
                let coord = chunk.coord();
                chunk.reset(coord);
                self.free_list.push(handle.index);
                true
            }
            _ => false,
        }
    }

    /// Gets a live chunk.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: ChunkHandle) -> Option<&Chunk> {
        if *self.live.get(handle.index)? {
            self.slots.get(handle.index)
        } else {
            None
        }
    }

    /// Gets a live chunk mutably.
    #[inline]
    pub fn get_mut(&mut self, handle: ChunkHandle) -> Option<&mut Chunk> {
        if *self.live.get(handle.index)? {
            self.slots.get_mut(handle.index)
        } else {
            None
        }
    }

    /// Number of slots currently handed out.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Number of released slots waiting for reuse.
    #[inline]
    #[must_use]
    pub fn pooled_count(&self) -> usize {
        self.free_list.len()
    }

    /// Total slots ever allocated.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over live chunks.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkHandle, &Chunk)> {
        self.slots
            .iter()
            .zip(&self.live)
            .enumerate()
            .filter(|(_, (_, live))| **live)
            .map(|(index, (chunk, _))| (ChunkHandle { index }, chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkState, ChunkVolume};
    use crate::material::Material;

    fn dims() -> ChunkDims {
        ChunkDims::new(4, 4, 4).unwrap()
    }

    #[test]
    fn test_pool_acquire_release() {
        let mut pool = ChunkPool::new(dims());

        let h1 = pool.acquire(ChunkCoord::new(0, 0));
        let h2 = pool.acquire(ChunkCoord::new(1, 0));
        assert_ne!(h1, h2);
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.get(h2).unwrap().coord(), ChunkCoord::new(1, 0));

        assert!(pool.release(h1));
        assert!(!pool.release(h1), "double release must be rejected");
        assert!(pool.get(h1).is_none());
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.pooled_count(), 1);
    }

    #[test]
    fn test_pool_reuses_slots_reset() {
        let dims = dims();
        let mut pool = ChunkPool::new(dims);

        let handle = pool.acquire(ChunkCoord::new(0, 0));
        pool.get_mut(handle)
            .unwrap()
            .populate(ChunkVolume::filled(dims, Material::Dirt));
        pool.release(handle);

        let reused = pool.acquire(ChunkCoord::new(5, 5));
        assert_eq!(reused, handle, "released slot should be handed out again");
        assert_eq!(pool.capacity(), 1);

        let chunk = pool.get(reused).unwrap();
        assert_eq!(chunk.coord(), ChunkCoord::new(5, 5));
        assert_eq!(chunk.state(), ChunkState::Unloaded);
        assert_eq!(chunk.volume().solid_count(), 0);
        assert!(chunk.mesh().is_none());
    }

    #[test]
    fn test_pool_with_capacity_preallocates() {
        let mut pool = ChunkPool::with_capacity(dims(), 3);
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.live_count(), 0);

        let handles: Vec<_> = (0..3).map(|i| pool.acquire(ChunkCoord::new(i, 0))).collect();
        assert_eq!(pool.capacity(), 3);
        assert_eq!(handles[0].index(), 0);
        assert_eq!(pool.iter().count(), 3);
    }
}
