//! # Evicted Cell Cache
//!
//! Keeps the cells of recently evicted chunks so walking back over old
//! ground restores them without regenerating. Cached volumes come back
//! verbatim, edits included.
//!
//! Access order is a monotonic counter; the smallest stamp is evicted first
//! once the cache is full.

use std::collections::{BTreeMap, HashMap};

use hexterra_core::{ChunkCoord, ChunkVolume};

/// Bounded LRU cache of chunk volumes keyed by chunk coordinate.
#[derive(Debug)]
pub struct CellCache {
    capacity: usize,
    entries: HashMap<ChunkCoord, (ChunkVolume, u64)>,
    /// Stamp -> coordinate, oldest first.
    order: BTreeMap<u64, ChunkCoord>,
    current_time: u64,
}

impl CellCache {
    /// Creates a cache holding at most `capacity` volumes. Zero disables it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            current_time: 0,
        }
    }

    /// Stores a volume, replacing any previous one for `coord`.
    ///
    /// Returns whichever entry did not fit: the oldest one pushed out, a
    /// replaced volume for the same coordinate, or the argument itself when
    /// the cache is disabled. Its buffer is free for reuse.
    pub fn insert(
        &mut self,
        coord: ChunkCoord,
        volume: ChunkVolume,
    ) -> Option<(ChunkCoord, ChunkVolume)> {
        if self.capacity == 0 {
            return Some((coord, volume));
        }
        self.current_time += 1;
        if let Some((old, stamp)) = self.entries.insert(coord, (volume, self.current_time)) {
            self.order.remove(&stamp);
            self.order.insert(self.current_time, coord);
            return Some((coord, old));
        }
        self.order.insert(self.current_time, coord);

        if self.entries.len() > self.capacity {
            let (_, oldest) = self.order.pop_first()?;
            let (volume, _) = self.entries.remove(&oldest)?;
            return Some((oldest, volume));
        }
        None
    }

    /// Removes and returns the volume for `coord`.
    pub fn take(&mut self, coord: ChunkCoord) -> Option<ChunkVolume> {
        let (volume, stamp) = self.entries.remove(&coord)?;
        self.order.remove(&stamp);
        Some(volume)
    }

    /// Returns true if `coord` is cached.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    /// Number of cached volumes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached volumes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub(crate) fn volumes(&self) -> impl Iterator<Item = &ChunkVolume> {
        self.entries.values().map(|(volume, _)| volume)
    }
}
