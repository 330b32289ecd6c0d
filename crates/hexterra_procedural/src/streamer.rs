//! # World Streamer
//!
//! Keeps the chunks around a moving reference point loaded and meshed.
//!
//! ## Per Tick
//!
//! 1. If the reference point entered a new chunk, retarget:
//!    evict chunks outside the window, cancel pending creations outside it,
//!    then queue the missing chunks nearest-first.
//! 2. Create up to `chunks_per_tick` queued chunks (cache or generator).
//! 3. Re-mesh up to `meshes_per_tick` stale chunks whose neighbors are not
//!    waiting to be created.
//!
//! Creating, editing or evicting a chunk marks every loaded neighbor stale,
//! because a neighbor's boundary faces depend on whether this chunk exists.
//!
//! ## Window
//!
//! A chunk is wanted while its Chebyshev distance to the reference chunk is
//! at most `render_distance`, i.e. a square of `(2r + 1)²` chunks.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use hexterra_core::{
    triangulate, Cell, Chunk, ChunkCoord, ChunkDims, ChunkHandle, ChunkNeighbors, ChunkPool,
    ChunkVolume, HexCoord, HexMetrics,
};
use tracing::{debug, info, trace};

use crate::cache::CellCache;
use crate::config::WorldConfig;
use crate::error::{ConfigError, WorldError, WorldResult};
use crate::events::{ChunkEvent, EventQueue};
use crate::generator::TerrainGenerator;
use crate::noise::{NoiseField, SimplexNoise};

/// Work done by one [`WorldStreamer::tick`] or [`WorldStreamer::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The reference chunk changed and the window was recomputed.
    pub retargeted: bool,
    /// Chunks unloaded.
    pub evicted: usize,
    /// Pending creations dropped because they left the window.
    pub cancelled: usize,
    /// Chunks newly queued for creation.
    pub enqueued: usize,
    /// Chunks created (generated or restored from cache).
    pub created: usize,
    /// Chunks (re)triangulated.
    pub meshed: usize,
    /// Creations still queued after this tick.
    pub pending: usize,
    /// Stale chunks still waiting for a mesh after this tick.
    pub stale: usize,
}

impl TickReport {
    /// Returns true if nothing is left to do until the reference point moves.
    #[inline]
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.pending == 0 && self.stale == 0
    }
}

/// Running totals and current sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks currently loaded.
    pub loaded: usize,
    /// Chunks queued for creation.
    pub pending: usize,
    /// Loaded chunks waiting for a mesh.
    pub stale: usize,
    /// Released slots waiting in the pool.
    pub pooled: usize,
    /// Evicted volumes in the cell cache.
    pub cached: usize,
    /// Chunks generated from noise this session.
    pub generated_total: u64,
    /// Chunks restored from the cell cache this session.
    pub restored_total: u64,
    /// Chunks evicted this session.
    pub evicted_total: u64,
    /// Pending creations cancelled this session.
    pub cancelled_total: u64,
    /// Triangulations this session.
    pub meshed_total: u64,
}

/// Streams chunks in and out around a reference point.
///
/// Single-threaded: every mutation happens inside the streamer's own
/// methods. Renderers consume [`ChunkEvent`]s from [`WorldStreamer::events`].
pub struct WorldStreamer<N = SimplexNoise> {
    config: WorldConfig,
    dims: ChunkDims,
    metrics: HexMetrics,
    generator: TerrainGenerator<N>,
    pool: ChunkPool,
    /// Live chunks. Keys are unique per loaded coordinate.
    loaded: HashMap<ChunkCoord, ChunkHandle>,
    /// Creation queue, nearest to the reference chunk first.
    pending: VecDeque<ChunkCoord>,
    pending_set: HashSet<ChunkCoord>,
    /// Loaded chunks that need a (new) mesh. Ordered for reproducible ticks.
    stale: BTreeSet<ChunkCoord>,
    cache: CellCache,
    /// Cleared-on-use cell buffers, swapped into slots whose cells go to the
    /// cache.
    spare: Vec<ChunkVolume>,
    events: EventQueue,
    center: Option<ChunkCoord>,
    stats: WorldStats,
}

impl WorldStreamer<SimplexNoise> {
    /// Creates a streamer with the simplex generator described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the config does not validate.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let generator = TerrainGenerator::from_config(&config)?;
        Self::with_generator(config, generator)
    }
}

impl<N: NoiseField> WorldStreamer<N> {
    /// Creates a streamer around a caller-built generator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the config does not validate or
    /// the generator produces chunks of a different size.
    pub fn with_generator(
        config: WorldConfig,
        generator: TerrainGenerator<N>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let dims = config.dims()?;
        if generator.dims() != dims {
            return Err(ConfigError::invalid(
                "chunk",
                format!("generator produces {:?}, config wants {dims:?}", generator.dims()),
            ));
        }
        let side = 2 * config.streaming.radius() as usize + 1;
        Ok(Self {
            metrics: config.metrics(),
            dims,
            generator,
            pool: ChunkPool::with_capacity(dims, side * side),
            loaded: HashMap::with_capacity(side * side),
            pending: VecDeque::new(),
            pending_set: HashSet::new(),
            stale: BTreeSet::new(),
            cache: CellCache::new(config.streaming.cache_capacity),
            spare: Vec::new(),
            events: EventQueue::new(),
            center: None,
            stats: WorldStats::default(),
            config,
        })
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Cell geometry.
    #[inline]
    #[must_use]
    pub const fn metrics(&self) -> &HexMetrics {
        &self.metrics
    }

    /// Chunk the window is currently centered on.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Handle to the event queue. Clones share the queue.
    #[must_use]
    pub fn events(&self) -> EventQueue {
        self.events.clone()
    }

    /// Advances streaming by one bounded step toward the window around the
    /// world-space point `(x, z)`.
    pub fn tick(&mut self, x: f32, z: f32) -> TickReport {
        let mut report = TickReport::default();
        let target = ChunkCoord::from_world_position(x, z, self.dims, &self.metrics);
        if self.center != Some(target) {
            self.retarget(target, &mut report);
        }

        for _ in 0..self.config.streaming.chunks_per_tick {
            let Some(coord) = self.pending.pop_front() else {
                break;
            };
            self.pending_set.remove(&coord);
            self.create(coord);
            report.created += 1;
        }

        report.meshed = self.remesh_ready(self.config.streaming.meshes_per_tick);
        self.finish(report)
    }

    /// Drains all queued creations and meshing, ignoring the per-tick budgets.
    pub fn flush(&mut self) -> TickReport {
        let mut report = TickReport::default();
        while let Some(coord) = self.pending.pop_front() {
            self.pending_set.remove(&coord);
            self.create(coord);
            report.created += 1;
        }
        report.meshed = self.remesh_ready(usize::MAX);
        self.finish(report)
    }

    fn finish(&self, mut report: TickReport) -> TickReport {
        report.pending = self.pending.len();
        report.stale = self.stale.len();
        report
    }

    /// Recomputes the window around `target`: evict, cancel, enqueue.
    fn retarget(&mut self, target: ChunkCoord, report: &mut TickReport) {
        let radius = self.config.streaming.radius();
        self.center = Some(target);
        report.retargeted = true;

        let mut outside: Vec<ChunkCoord> = self
            .loaded
            .keys()
            .copied()
            .filter(|coord| coord.chebyshev_distance(target) > radius)
            .collect();
        outside.sort_unstable();
        for coord in outside {
            self.evict(coord);
            report.evicted += 1;
        }

        let before = self.pending.len();
        self.pending
            .retain(|coord| coord.chebyshev_distance(target) <= radius);
        self.pending_set
            .retain(|coord| coord.chebyshev_distance(target) <= radius);
        report.cancelled = before - self.pending.len();
        self.stats.cancelled_total += report.cancelled as u64;

        let r = radius as i32;
        for dz in -r..=r {
            for dx in -r..=r {
                let coord = ChunkCoord::new(target.x + dx, target.z + dz);
                if !self.loaded.contains_key(&coord) && self.pending_set.insert(coord) {
                    self.pending.push_back(coord);
                    report.enqueued += 1;
                }
            }
        }
        self.pending
            .make_contiguous()
            .sort_by_key(|coord| (coord.chebyshev_distance(target), coord.z, coord.x));

        info!(
            x = target.x,
            z = target.z,
            evicted = report.evicted,
            cancelled = report.cancelled,
            enqueued = report.enqueued,
            "retargeted streaming window"
        );
    }

    /// Loads the chunk at `coord` from the cache or the generator.
    fn create(&mut self, coord: ChunkCoord) {
        debug_assert!(
            !self.loaded.contains_key(&coord),
            "creating chunk ({}, {}) that is already loaded",
            coord.x,
            coord.z
        );
        let handle = self.pool.acquire(coord);
        let Some(chunk) = self.pool.get_mut(handle) else {
            return;
        };

        if let Some(volume) = self.cache.take(coord) {
            self.spare.push(chunk.populate(volume));
            self.stats.restored_total += 1;
            debug!(x = coord.x, z = coord.z, "restored chunk from cache");
        } else {
            self.generator.generate_into(coord, chunk.volume_mut());
            chunk.mark_generated();
            self.stats.generated_total += 1;
        }

        self.loaded.insert(coord, handle);
        self.mark_stale_with_neighbors(coord);
    }

    /// Unloads the chunk at `coord`, caching its cells and pooling its slot.
    fn evict(&mut self, coord: ChunkCoord) {
        let Some(handle) = self.loaded.remove(&coord) else {
            return;
        };
        if let Some(chunk) = self.pool.get_mut(handle) {
            let was_shown = chunk.mesh().is_some();
            if self.cache.capacity() > 0 && chunk.state().has_cells() {
                let dims = self.dims;
                let replacement = self.spare.pop().unwrap_or_else(|| ChunkVolume::new(dims));
                let volume = chunk.swap_volume(replacement);
                if let Some((dropped, buffer)) = self.cache.insert(coord, volume) {
                    trace!(x = dropped.x, z = dropped.z, "cell cache dropped chunk");
                    self.spare.push(buffer);
                }
            }
            if was_shown {
                self.events.push(ChunkEvent::Removed { coord });
            }
        }
        let released = self.pool.release(handle);
        debug_assert!(released, "loaded chunk had a dead pool handle");

        self.stale.remove(&coord);
        self.stats.evicted_total += 1;
        for neighbor in coord.neighbors() {
            self.mark_stale(neighbor);
        }
        debug!(x = coord.x, z = coord.z, "evicted chunk");
    }

    fn mark_stale(&mut self, coord: ChunkCoord) {
        if let Some(&handle) = self.loaded.get(&coord) {
            if let Some(chunk) = self.pool.get_mut(handle) {
                chunk.mark_stale();
            }
            self.stale.insert(coord);
        }
    }

    fn mark_stale_with_neighbors(&mut self, coord: ChunkCoord) {
        self.mark_stale(coord);
        for neighbor in coord.neighbors() {
            self.mark_stale(neighbor);
        }
    }

    /// A stale chunk may be meshed once no neighbor it reads is still queued.
    fn ready_to_mesh(&self, coord: ChunkCoord) -> bool {
        coord
            .neighbors()
            .iter()
            .all(|neighbor| !self.pending_set.contains(neighbor))
    }

    fn remesh_ready(&mut self, budget: usize) -> usize {
        let ready: Vec<ChunkCoord> = self
            .stale
            .iter()
            .copied()
            .filter(|&coord| self.ready_to_mesh(coord))
            .take(budget)
            .collect();
        for &coord in &ready {
            self.stale.remove(&coord);
            self.remesh(coord);
        }
        ready.len()
    }

    /// Triangulates one loaded chunk against its loaded neighbors.
    fn remesh(&mut self, coord: ChunkCoord) {
        let Some(&handle) = self.loaded.get(&coord) else {
            return;
        };
        let mesh = {
            let pool = &self.pool;
            let loaded = &self.loaded;
            let Some(chunk) = pool.get(handle) else {
                return;
            };
            let neighbors = ChunkNeighbors::from_fn(|direction| {
                loaded
                    .get(&coord.neighbor(direction))
                    .and_then(|&h| pool.get(h))
                    .map(Chunk::volume)
            });
            trace!(
                x = coord.x,
                z = coord.z,
                neighbors = neighbors.loaded_count(),
                "triangulating chunk"
            );
            Arc::new(triangulate(chunk.volume(), &neighbors, &self.metrics))
        };

        let Some(chunk) = self.pool.get_mut(handle) else {
            return;
        };
        let first = chunk.mesh().is_none();
        let origin = chunk.world_origin(&self.metrics);
        trace!(
            x = coord.x,
            z = coord.z,
            triangles = mesh.triangle_count(),
            vertices = mesh.vertices.len(),
            "meshed chunk"
        );
        chunk.set_mesh(Arc::clone(&mesh));
        self.stats.meshed_total += 1;

        let event = if first {
            ChunkEvent::Added { coord, origin, mesh }
        } else {
            ChunkEvent::Updated { coord, origin, mesh }
        };
        self.events.push(event);
        debug!(x = coord.x, z = coord.z, first, "remeshed chunk");
    }

    /// Replaces the cell at global offset `(col, row)`, layer `y`.
    ///
    /// The chunk and its loaded neighbors are re-meshed on later ticks.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ChunkNotLoaded`] if the chunk is not loaded and
    /// [`WorldError::Chunk`] if `y` is above the chunk.
    pub fn set_cell(&mut self, col: i32, y: usize, row: i32, cell: Cell) -> WorldResult<()> {
        let coord = ChunkCoord::from_cell(col, row, self.dims);
        let handle = *self
            .loaded
            .get(&coord)
            .ok_or(WorldError::ChunkNotLoaded(coord))?;
        let chunk = self
            .pool
            .get_mut(handle)
            .ok_or(WorldError::ChunkNotLoaded(coord))?;
        let (col0, row0) = coord.first_cell(self.dims);
        chunk
            .volume_mut()
            .set((col - col0) as usize, y, (row - row0) as usize, cell)?;
        self.mark_stale_with_neighbors(coord);
        Ok(())
    }

    /// Cell at global offset `(col, row)`, layer `y`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ChunkNotLoaded`] if the chunk is not loaded and
    /// [`WorldError::Chunk`] if `y` is above the chunk.
    pub fn get_cell(&self, col: i32, y: usize, row: i32) -> WorldResult<Cell> {
        let coord = ChunkCoord::from_cell(col, row, self.dims);
        let chunk = self.chunk(coord).ok_or(WorldError::ChunkNotLoaded(coord))?;
        let (col0, row0) = coord.first_cell(self.dims);
        Ok(chunk
            .volume()
            .get((col - col0) as usize, y, (row - row0) as usize)?)
    }

    /// Cell containing the world-space point `(x, y, z)`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LayerOutOfRange`] below the floor or above the
    /// top layer and [`WorldError::ChunkNotLoaded`] if the chunk is not loaded.
    pub fn cell_at(&self, x: f32, y: f32, z: f32) -> WorldResult<Cell> {
        let layer = (y / self.metrics.cell_height).floor() as i64;
        let height = self.dims.height();
        let y = usize::try_from(layer)
            .ok()
            .filter(|&layer| layer < height)
            .ok_or(WorldError::LayerOutOfRange { layer, height })?;
        let (col, row) = HexCoord::from_world_position(x, z, &self.metrics).to_offset();
        self.get_cell(col, y, row)
    }

    /// World-space height at which something standing at `(x, z)` rests:
    /// the bottom of the first empty cell above the column's surface.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ChunkNotLoaded`] if the chunk is not loaded.
    pub fn spawn_height(&self, x: f32, z: f32) -> WorldResult<f32> {
        let (col, row) = HexCoord::from_world_position(x, z, &self.metrics).to_offset();
        let coord = ChunkCoord::from_cell(col, row, self.dims);
        let chunk = self.chunk(coord).ok_or(WorldError::ChunkNotLoaded(coord))?;
        let (col0, row0) = coord.first_cell(self.dims);
        let surface = chunk
            .volume()
            .surface_height((col - col0) as usize, (row - row0) as usize)?;
        let layer = surface.map_or(0, |h| h + 1);
        Ok(layer as f32 * self.metrics.cell_height)
    }

    /// Loaded chunk at `coord`.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.pool.get(*self.loaded.get(&coord)?)
    }

    /// Returns true if `coord` is loaded.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains_key(&coord)
    }

    /// Returns true if `coord` is queued for creation.
    #[inline]
    #[must_use]
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending_set.contains(&coord)
    }

    /// Loaded coordinates, sorted.
    #[must_use]
    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.loaded.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Coordinates queued for creation, in processing order.
    #[must_use]
    pub fn pending_coords(&self) -> Vec<ChunkCoord> {
        self.pending.iter().copied().collect()
    }

    /// Current sizes and running totals.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            loaded: self.loaded.len(),
            pending: self.pending.len(),
            stale: self.stale.len(),
            pooled: self.pool.pooled_count(),
            cached: self.cache.len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexterra_core::{ChunkState, Material};

    fn streamer() -> WorldStreamer {
        WorldStreamer::new(WorldConfig::small()).unwrap()
    }

    /// World-space center of chunk `coord`.
    fn chunk_center(streamer: &WorldStreamer, coord: ChunkCoord) -> (f32, f32) {
        let dims = streamer.dims;
        let [x, _, z] = coord.world_origin(dims, &streamer.metrics);
        let half_w = dims.width() as f32 * streamer.metrics.column_spacing() * 0.5;
        let half_l = dims.length() as f32 * streamer.metrics.row_spacing() * 0.5;
        (x + half_w, z + half_l)
    }

    fn window(center: ChunkCoord, r: i32) -> Vec<ChunkCoord> {
        let mut coords = Vec::new();
        for z in -r..=r {
            for x in -r..=r {
                coords.push(ChunkCoord::new(center.x + x, center.z + z));
            }
        }
        coords.sort_unstable();
        coords
    }

    #[test]
    fn test_first_tick_enqueues_window_nearest_first() {
        let mut streamer = streamer();
        let report = streamer.tick(1.0, 1.0);

        assert!(report.retargeted);
        assert_eq!(report.enqueued, 25);
        assert_eq!(report.created, 2);
        assert_eq!(report.pending, 23);
        // The reference chunk comes first
        assert!(streamer.is_loaded(ChunkCoord::new(0, 0)));
        let order = streamer.pending_coords();
        let distances: Vec<u32> = order
            .iter()
            .map(|c| c.chebyshev_distance(ChunkCoord::new(0, 0)))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_meshing_waits_for_pending_neighbors() {
        let mut streamer = streamer();
        streamer.tick(1.0, 1.0);

        // Neighbors of the origin are still queued, so nothing is meshed yet
        assert!(streamer.events().is_empty());
        let chunk = streamer.chunk(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(chunk.state(), ChunkState::Generated);
    }

    #[test]
    fn test_flush_settles_window() {
        let mut streamer = streamer();
        streamer.tick(1.0, 1.0);
        let report = streamer.flush();

        assert!(report.is_settled());
        assert_eq!(streamer.loaded_coords(), window(ChunkCoord::new(0, 0), 2));
        for coord in streamer.loaded_coords() {
            assert_eq!(streamer.chunk(coord).unwrap().state(), ChunkState::Meshed);
        }
        let events = streamer.events().drain();
        let added = events
            .iter()
            .filter(|e| matches!(e, ChunkEvent::Added { .. }))
            .count();
        assert_eq!(added, 25);
    }

    #[test]
    fn test_pacing_respects_budgets() {
        let mut streamer = streamer();
        let budget = streamer.config().streaming.chunks_per_tick;
        let mut ticks = 0;
        loop {
            let report = streamer.tick(1.0, 1.0);
            assert!(report.created <= budget);
            assert!(report.meshed <= streamer.config().streaming.meshes_per_tick);
            ticks += 1;
            if report.is_settled() {
                break;
            }
            assert!(ticks < 1000, "streaming never settled");
        }
        assert!(ticks >= 25 / budget);
        assert_eq!(streamer.stats().loaded, 25);
    }

    #[test]
    fn test_move_evicts_and_reloads_identically() {
        let mut streamer = streamer();
        let origin = ChunkCoord::new(0, 0);
        let (x, z) = chunk_center(&streamer, origin);
        streamer.tick(x, z);
        streamer.flush();
        let before = streamer.chunk(ChunkCoord::new(-2, 0)).unwrap().volume().clone();

        let far = ChunkCoord::new(10, 0);
        let (fx, fz) = chunk_center(&streamer, far);
        let report = streamer.tick(fx, fz);
        assert_eq!(report.evicted, 25);
        streamer.flush();
        assert!(!streamer.is_loaded(ChunkCoord::new(-2, 0)));

        streamer.tick(x, z);
        streamer.flush();
        let after = streamer.chunk(ChunkCoord::new(-2, 0)).unwrap().volume();
        assert_eq!(before.as_bytes(), after.as_bytes());
        assert!(streamer.stats().restored_total > 0);
    }

    /// Addresses of every cell buffer the streamer owns.
    fn buffer_addresses(streamer: &WorldStreamer) -> HashSet<usize> {
        let slots = streamer.pool.iter().map(|(_, chunk)| chunk.volume());
        slots
            .chain(streamer.cache.volumes())
            .chain(&streamer.spare)
            .map(|volume| volume.as_bytes().as_ptr() as usize)
            .collect()
    }

    #[test]
    fn test_round_trips_recycle_cell_buffers() {
        let mut streamer = streamer();
        let home = chunk_center(&streamer, ChunkCoord::new(0, 0));
        let away = chunk_center(&streamer, ChunkCoord::new(6, 0));
        let visit = |streamer: &mut WorldStreamer, (x, z): (f32, f32)| {
            streamer.tick(x, z);
            streamer.flush();
        };

        // Warm up: the first trips fill the cache and the spare list
        visit(&mut streamer, home);
        visit(&mut streamer, away);
        visit(&mut streamer, home);
        let warm = buffer_addresses(&streamer);
        assert_eq!(warm.len(), 75);

        for _ in 0..3 {
            visit(&mut streamer, away);
            visit(&mut streamer, home);
        }

        assert_eq!(buffer_addresses(&streamer), warm);
        assert!(streamer.stats().restored_total >= 25 * 6);
    }

    #[test]
    fn test_cancelled_creations_leave_nothing_behind() {
        let mut streamer = streamer();
        streamer.tick(1.0, 1.0);
        let queued = streamer.pending_coords();

        let far = ChunkCoord::new(50, 50);
        let (fx, fz) = chunk_center(&streamer, far);
        let report = streamer.tick(fx, fz);

        assert_eq!(report.cancelled, queued.len());
        for coord in queued {
            assert!(!streamer.is_pending(coord));
            assert!(!streamer.is_loaded(coord));
        }
        assert_eq!(streamer.stats().cancelled_total, 23);
    }

    #[test]
    fn test_eviction_emits_removed_only_for_shown_chunks() {
        let mut streamer = streamer();
        let (x, z) = chunk_center(&streamer, ChunkCoord::new(0, 0));
        streamer.tick(x, z);
        streamer.flush();
        let events = streamer.events();
        events.drain();

        let (fx, fz) = chunk_center(&streamer, ChunkCoord::new(1, 0));
        streamer.tick(fx, fz);
        let removed: Vec<ChunkCoord> = events
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                ChunkEvent::Removed { coord } => Some(coord),
                _ => None,
            })
            .collect();
        assert_eq!(removed.len(), 5);
        assert!(removed.iter().all(|c| c.x == -2));
    }

    #[test]
    fn test_set_cell_marks_neighbors_stale() {
        let mut streamer = streamer();
        let (x, z) = chunk_center(&streamer, ChunkCoord::new(0, 0));
        streamer.tick(x, z);
        streamer.flush();
        streamer.events().drain();

        streamer.set_cell(3, 1, 3, Cell::AIR).unwrap();
        assert_eq!(streamer.get_cell(3, 1, 3).unwrap(), Cell::AIR);
        let report = streamer.flush();
        // The edited chunk and its six neighbors
        assert_eq!(report.meshed, 7);
        assert!(streamer
            .events()
            .drain()
            .iter()
            .all(|e| matches!(e, ChunkEvent::Updated { .. })));
    }

    #[test]
    fn test_lookups_outside_loaded_world() {
        let mut streamer = streamer();
        streamer.tick(1.0, 1.0);
        streamer.flush();

        assert_eq!(
            streamer.set_cell(1000, 0, 0, Cell::new(Material::Dirt)),
            Err(WorldError::ChunkNotLoaded(ChunkCoord::new(125, 0)))
        );
        assert!(matches!(
            streamer.get_cell(0, 500, 0),
            Err(WorldError::Chunk(_))
        ));
        assert!(matches!(
            streamer.cell_at(1.0, -3.0, 1.0),
            Err(WorldError::LayerOutOfRange { .. })
        ));
    }

    #[test]
    fn test_spawn_height_is_above_surface() {
        let mut streamer = streamer();
        streamer.tick(1.0, 1.0);
        streamer.flush();

        let (x, z) = (5.0, 4.0);
        let spawn = streamer.spawn_height(x, z).unwrap();
        let metrics = *streamer.metrics();
        assert!(!streamer.cell_at(x, spawn + 0.5 * metrics.cell_height, z).unwrap().is_solid());
        if spawn > 0.0 {
            assert!(streamer.cell_at(x, spawn - 0.5 * metrics.cell_height, z).unwrap().is_solid());
        }
    }

    #[test]
    fn test_generator_size_must_match_config() {
        let config = WorldConfig::small();
        let generator = TerrainGenerator::new(
            &config.generation,
            ChunkDims::new(4, 8, 4).unwrap(),
            config.metrics(),
        );
        assert!(WorldStreamer::with_generator(config, generator).is_err());
    }
}
