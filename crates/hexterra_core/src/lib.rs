//! # HEXTERRA Core
//!
//! Grid primitives for a voxel terrain built from hexagonal prisms.
//!
//! ## Design Principles
//!
//! 1. **One byte per cell**: a cell is its material tag, nothing more
//! 2. **Chunked**: cells live in dense fixed-size chunks, never individually
//! 3. **Pure meshing**: triangulation borrows cells and never mutates them
//! 4. **Recycled**: evicted chunk slots go back to a pool, not the allocator
//!
//! ## Core Components
//!
//! - `HexCoord` / `HexDirection`: axial and offset coordinates, neighbor algebra
//! - `HexMetrics`: prism geometry (corners, spacing, cell placement)
//! - `Material` / `Cell`: closed material table
//! - `ChunkVolume` / `Chunk`: cell storage and chunk lifecycle
//! - `ChunkPool`: slot recycling
//! - `triangulate`: boundary-aware surface extraction
//!
//! ## Example
//!
//! ```rust
//! use hexterra_core::{
//!     triangulate, Cell, ChunkDims, ChunkNeighbors, ChunkVolume, HexMetrics, Material,
//! };
//!
//! let dims = ChunkDims::new(4, 4, 4).unwrap();
//! let mut volume = ChunkVolume::new(dims);
//! volume.set(1, 1, 1, Cell::new(Material::Grass)).unwrap();
//!
//! let mesh = triangulate(&volume, &ChunkNeighbors::none(), &HexMetrics::default());
//! assert_eq!(mesh.triangle_count(), 24);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod error;
pub mod hex;
pub mod material;
pub mod mesh;
pub mod pool;

pub use chunk::{
    Chunk, ChunkCoord, ChunkDims, ChunkDirection, ChunkState, ChunkVolume, ColumnFill,
};
pub use error::{ChunkError, ChunkResult};
pub use hex::{HexCoord, HexDirection, HexMetrics};
pub use material::{Cell, Material, MaterialInfo, MATERIALS};
pub use mesh::{
    count_visible_faces, triangulate, triangulate_into, ChunkMesh, ChunkNeighbors, MeshVertex,
};
pub use pool::{ChunkHandle, ChunkPool};
