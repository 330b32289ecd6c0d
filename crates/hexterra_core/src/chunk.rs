//! # Chunk System
//!
//! The hex grid is cut into rectangular blocks of offset-space cells:
//! `width` columns by `length` rows, `height` layers tall. Height is never
//! chunked.
//!
//! ## Layout
//!
//! Cells are stored densely, indexed as `x + z * width + y * width * length`
//! (one horizontal layer after another).
//!
//! ## Row Parity
//!
//! `length` is always even, so local row parity equals global row parity in
//! every chunk. That keeps the staggering identical across chunks and limits
//! the chunks a cell can border to the six [`ChunkDirection`]s.

use std::sync::Arc;

use crate::error::{ChunkError, ChunkResult};
use crate::hex::HexMetrics;
use crate::material::{Cell, Material};
use crate::mesh::ChunkMesh;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not cells).
    pub x: i32,
    /// Z coordinate (in chunks, not cells).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the chunk containing the offset cell `(col, row)`.
    #[inline]
    #[must_use]
    pub const fn from_cell(col: i32, row: i32, dims: ChunkDims) -> Self {
        Self {
            x: col.div_euclid(dims.width as i32),
            z: row.div_euclid(dims.length as i32),
        }
    }

    /// Returns the chunk under the world-space point `(x, z)`.
    #[must_use]
    pub fn from_world_position(x: f32, z: f32, dims: ChunkDims, metrics: &HexMetrics) -> Self {
        let chunk_width = dims.width as f32 * metrics.column_spacing();
        let chunk_length = dims.length as f32 * metrics.row_spacing();
        Self {
            x: (x / chunk_width).floor() as i32,
            z: (z / chunk_length).floor() as i32,
        }
    }

    /// Returns the neighboring chunk in `direction`.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, direction: ChunkDirection) -> Self {
        let (dx, dz) = direction.offset();
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Returns all six neighbors in rotational order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        ChunkDirection::ALL.map(|direction| self.neighbor(direction))
    }

    /// Chebyshev (king-move) distance in chunks.
    #[inline]
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        if dx > dz {
            dx
        } else {
            dz
        }
    }

    /// Offset-space cell `(col, row)` of this chunk's first cell.
    #[inline]
    #[must_use]
    pub const fn first_cell(self, dims: ChunkDims) -> (i32, i32) {
        (self.x * dims.width as i32, self.z * dims.length as i32)
    }

    /// World-space position of the chunk origin (`y` is always zero).
    #[must_use]
    pub fn world_origin(self, dims: ChunkDims, metrics: &HexMetrics) -> [f32; 3] {
        [
            self.x as f32 * dims.width as f32 * metrics.column_spacing(),
            0.0,
            self.z as f32 * dims.length as f32 * metrics.row_spacing(),
        ]
    }
}

/// Direction from a chunk to one of the six chunks its cells can border.
///
/// Because odd rows lean east, a chunk's top row touches the chunks to the
/// north and north-east, and its bottom row touches south and south-west.
/// The north-west and south-east chunks are never adjacent to any cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ChunkDirection {
    /// `(0, +1)`
    North = 0,
    /// `(+1, +1)`
    NorthEast = 1,
    /// `(+1, 0)`
    East = 2,
    /// `(0, -1)`
    South = 3,
    /// `(-1, -1)`
    SouthWest = 4,
    /// `(-1, 0)`
    West = 5,
}

impl ChunkDirection {
    /// All directions in rotational order.
    pub const ALL: [Self; 6] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::South,
        Self::SouthWest,
        Self::West,
    ];

    /// Returns the rotational index (0..6).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the direction pointing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }

    /// Chunk-grid `(dx, dz)` of this direction.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
        }
    }

    /// Maps a chunk-grid step back to a direction.
    ///
    /// Returns `None` for `(0, 0)` and for the two diagonals no cell can
    /// cross into.
    #[inline]
    #[must_use]
    pub const fn from_offset(dx: i32, dz: i32) -> Option<Self> {
        match (dx, dz) {
            (0, 1) => Some(Self::North),
            (1, 1) => Some(Self::NorthEast),
            (1, 0) => Some(Self::East),
            (0, -1) => Some(Self::South),
            (-1, -1) => Some(Self::SouthWest),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Size of a chunk in cells.
///
/// Only [`ChunkDims::new`] and `Default` build one, so every value in use
/// has nonzero sides and an even length:
///
/// ```compile_fail
/// use hexterra_core::ChunkDims;
///
/// let dims = ChunkDims { width: 4, height: 12, length: 3 };
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDims {
    width: usize,
    height: usize,
    length: usize,
}

impl ChunkDims {
    /// Default chunk width/length in cells.
    pub const DEFAULT_SIZE: usize = 16;
    /// Default chunk height in cells.
    pub const DEFAULT_HEIGHT: usize = 64;

    /// Creates validated chunk dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidDimensions`] if any dimension is zero or
    /// `length` is odd.
    pub fn new(width: usize, height: usize, length: usize) -> ChunkResult<Self> {
        if width == 0 || height == 0 || length == 0 {
            return Err(ChunkError::InvalidDimensions(format!(
                "{width}x{height}x{length} has a zero dimension"
            )));
        }
        if length % 2 != 0 {
            return Err(ChunkError::InvalidDimensions(format!(
                "length {length} must be even to keep row parity aligned across chunks"
            )));
        }
        Ok(Self {
            width,
            height,
            length,
        })
    }

    /// Columns (x).
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        self.width
    }

    /// Layers (y).
    #[inline]
    #[must_use]
    pub const fn height(self) -> usize {
        self.height
    }

    /// Rows (z). Always even.
    #[inline]
    #[must_use]
    pub const fn length(self) -> usize {
        self.length
    }

    /// Total cells per chunk.
    #[inline]
    #[must_use]
    pub const fn volume(self) -> usize {
        self.width * self.height * self.length
    }

    /// Returns true if `(x, y, z)` lies inside the chunk.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: usize, y: usize, z: usize) -> bool {
        x < self.width && y < self.height && z < self.length
    }

    /// Flat index of `(x, y, z)`. The caller guarantees bounds.
    #[inline]
    #[must_use]
    pub const fn index(self, x: usize, y: usize, z: usize) -> usize {
        x + z * self.width + y * self.width * self.length
    }

    fn out_of_bounds(self, x: usize, y: usize, z: usize) -> ChunkError {
        ChunkError::OutOfBounds {
            x,
            y,
            z,
            width: self.width,
            height: self.height,
            length: self.length,
        }
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_HEIGHT,
            length: Self::DEFAULT_SIZE,
        }
    }
}

/// Dense cell array of one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkVolume {
    dims: ChunkDims,
    cells: Vec<Cell>,
}

impl ChunkVolume {
    /// Creates an all-air volume.
    #[must_use]
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            cells: vec![Cell::AIR; dims.volume()],
        }
    }

    /// Creates a volume with every cell set to `material`.
    #[must_use]
    pub fn filled(dims: ChunkDims, material: Material) -> Self {
        Self {
            dims,
            cells: vec![Cell::new(material); dims.volume()],
        }
    }

    /// Returns the dimensions.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Gets the cell at local coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfBounds`] if the index lies outside the chunk.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> ChunkResult<Cell> {
        if self.dims.contains(x, y, z) {
            Ok(self.cells[self.dims.index(x, y, z)])
        } else {
            Err(self.dims.out_of_bounds(x, y, z))
        }
    }

    /// Sets the cell at local coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfBounds`] if the index lies outside the chunk.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, cell: Cell) -> ChunkResult<()> {
        if self.dims.contains(x, y, z) {
            let index = self.dims.index(x, y, z);
            self.cells[index] = cell;
            Ok(())
        } else {
            Err(self.dims.out_of_bounds(x, y, z))
        }
    }

    /// Solidity lookup for callers that already walk the chunk bounds.
    #[inline]
    pub(crate) fn is_solid_at(&self, x: usize, y: usize, z: usize) -> bool {
        debug_assert!(self.dims.contains(x, y, z));
        self.cells[self.dims.index(x, y, z)].is_solid()
    }

    /// Material lookup for callers that already walk the chunk bounds.
    #[inline]
    pub(crate) fn material_at(&self, x: usize, y: usize, z: usize) -> Material {
        debug_assert!(self.dims.contains(x, y, z));
        self.cells[self.dims.index(x, y, z)].material()
    }

    /// Writes a whole column: `solid` below `surface_y`, `surface` at
    /// `surface_y`, air above.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfBounds`] if the column or `surface_y` lies
    /// outside the chunk.
    pub fn fill_column(
        &mut self,
        x: usize,
        z: usize,
        surface_y: usize,
        solid: Material,
        surface: Material,
    ) -> ChunkResult<()> {
        if !self.dims.contains(x, surface_y, z) {
            return Err(self.dims.out_of_bounds(x, surface_y, z));
        }
        self.write_column(
            x,
            z,
            ColumnFill {
                surface_y,
                fill: solid,
                surface,
            },
        );
        Ok(())
    }

    /// Rewrites every column from `column(x, z)`.
    ///
    /// A `surface_y` above the top layer is cut to the top layer.
    pub fn fill_columns(&mut self, mut column: impl FnMut(usize, usize) -> ColumnFill) {
        for z in 0..self.dims.length {
            for x in 0..self.dims.width {
                let mut fill = column(x, z);
                debug_assert!(fill.surface_y < self.dims.height, "surface above chunk top");
                fill.surface_y = fill.surface_y.min(self.dims.height - 1);
                self.write_column(x, z, fill);
            }
        }
    }

    fn write_column(&mut self, x: usize, z: usize, column: ColumnFill) {
        for y in 0..self.dims.height {
            let material = match y.cmp(&column.surface_y) {
                std::cmp::Ordering::Less => column.fill,
                std::cmp::Ordering::Equal => column.surface,
                std::cmp::Ordering::Greater => Material::Air,
            };
            let index = self.dims.index(x, y, z);
            self.cells[index] = Cell::new(material);
        }
    }

    /// Returns the layer of the highest solid cell in a column, or `None` if
    /// the column is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfBounds`] if the column lies outside the chunk.
    pub fn surface_height(&self, x: usize, z: usize) -> ChunkResult<Option<usize>> {
        if !self.dims.contains(x, 0, z) {
            return Err(self.dims.out_of_bounds(x, 0, z));
        }
        Ok((0..self.dims.height)
            .rev()
            .find(|&y| self.is_solid_at(x, y, z)))
    }

    /// Resets every cell to air.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::AIR);
    }

    /// Changes dimensions, clearing all cells and keeping the allocation.
    pub fn resize(&mut self, dims: ChunkDims) {
        self.dims = dims;
        self.cells.clear();
        self.cells.resize(dims.volume(), Cell::AIR);
    }

    /// Counts solid cells.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_solid()).count()
    }

    /// Raw material bytes in storage order.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }
}

/// Layout of one column: `fill` below `surface_y`, `surface` at it, air above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnFill {
    /// Layer of the surface cell.
    pub surface_y: usize,
    /// Material below the surface.
    pub fill: Material,
    /// Material of the surface cell.
    pub surface: Material,
}

/// Lifecycle of a chunk slot.
///
/// ```text
/// Unloaded ──generate──▶ Generated ──mesh──▶ Meshed ◀──mesh── Stale
///    ▲                                         │  ▲            │
///    │                                         │  └─neighbor───┘
///    └──────────────────evict──────────────────┘     changed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Slot holds no terrain (fresh or pooled).
    #[default]
    Unloaded,
    /// Cells populated, never meshed.
    Generated,
    /// Mesh matches the cells and the loaded neighbors.
    Meshed,
    /// Mesh exists but the chunk or a neighbor changed since.
    Stale,
}

impl ChunkState {
    /// Returns true if the chunk holds terrain.
    #[inline]
    #[must_use]
    pub const fn has_cells(self) -> bool {
        !matches!(self, Self::Unloaded)
    }

    /// Returns true if the chunk must be (re)triangulated.
    #[inline]
    #[must_use]
    pub const fn needs_mesh(self) -> bool {
        matches!(self, Self::Generated | Self::Stale)
    }
}

/// A chunk of the world: cells, lifecycle state and latest mesh.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    volume: ChunkVolume,
    state: ChunkState,
    mesh: Option<Arc<ChunkMesh>>,
}

impl Chunk {
    /// Creates an unloaded chunk with an all-air volume.
    #[must_use]
    pub fn new(coord: ChunkCoord, dims: ChunkDims) -> Self {
        Self {
            coord,
            volume: ChunkVolume::new(dims),
            state: ChunkState::Unloaded,
            mesh: None,
        }
    }

    /// Chunk position in the world.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ChunkState {
        self.state
    }

    /// Cell data.
    #[inline]
    #[must_use]
    pub const fn volume(&self) -> &ChunkVolume {
        &self.volume
    }

    /// Mutable cell data. Does not change the lifecycle state.
    #[inline]
    pub fn volume_mut(&mut self) -> &mut ChunkVolume {
        &mut self.volume
    }

    /// Latest mesh, if the chunk was ever triangulated since its last reset.
    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<&Arc<ChunkMesh>> {
        self.mesh.as_ref()
    }

    /// Installs freshly generated or restored cells.
    ///
    /// Returns the volume the slot held before, for reuse.
    pub fn populate(&mut self, volume: ChunkVolume) -> ChunkVolume {
        debug_assert_eq!(volume.dims(), self.volume.dims(), "populating with a foreign size");
        self.state = ChunkState::Generated;
        self.mesh = None;
        std::mem::replace(&mut self.volume, volume)
    }

    /// Marks generation as done on cells written in place via
    /// [`Chunk::volume_mut`].
    pub fn mark_generated(&mut self) {
        self.state = ChunkState::Generated;
        self.mesh = None;
    }

    /// Flags the mesh as out of date. No-op for chunks that are unloaded or
    /// not yet meshed.
    pub fn mark_stale(&mut self) {
        if self.state == ChunkState::Meshed {
            self.state = ChunkState::Stale;
        }
    }

    /// Stores a new mesh and marks the chunk meshed.
    pub fn set_mesh(&mut self, mesh: Arc<ChunkMesh>) {
        debug_assert!(self.state.has_cells(), "meshing a chunk with no terrain");
        self.mesh = Some(mesh);
        self.state = ChunkState::Meshed;
    }

    /// Moves the cells out and installs `replacement` in their place.
    ///
    /// The state is left alone; callers release or repopulate the slot next.
    pub fn swap_volume(&mut self, replacement: ChunkVolume) -> ChunkVolume {
        debug_assert_eq!(replacement.dims(), self.volume.dims(), "swapping in a foreign size");
        std::mem::replace(&mut self.volume, replacement)
    }

    /// Resets the slot for reuse at `coord`: cells cleared, mesh discarded.
    pub fn reset(&mut self, coord: ChunkCoord) {
        self.coord = coord;
        self.volume.clear();
        self.state = ChunkState::Unloaded;
        self.mesh = None;
    }

    /// World-space position of the chunk origin.
    #[must_use]
    pub fn world_origin(&self, metrics: &HexMetrics) -> [f32; 3] {
        self.coord.world_origin(self.volume.dims(), metrics)
    }
}
