//! # HEXTERRA Procedural Generation
//!
//! Deterministic hex-prism terrain, streamed around a moving viewer.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same terrain
//! 2. **Chunked**: Terrain is generated and meshed one chunk at a time
//! 3. **Streamable**: Chunks load and unload around the viewer independently
//! 4. **Paced**: Each tick does a bounded amount of work
//!
//! ## Core Components
//!
//! - `SimplexNoise` / `NoiseField`: seeded 2D/3D noise and fractal sums
//! - `WorldConfig`: TOML configuration with validation
//! - `TerrainGenerator`: height field per chunk
//! - `CellCache`: evicted chunks kept for instant reload
//! - `WorldStreamer`: load/evict/pool/re-mesh scheduling
//! - `EventQueue`: mesh add/update/remove notifications
//!
//! ## Example
//!
//! ```rust
//! use hexterra_procedural::{WorldConfig, WorldStreamer};
//!
//! let mut streamer = WorldStreamer::new(WorldConfig::small()).unwrap();
//!
//! // Viewer at world position (10, 10)
//! streamer.tick(10.0, 10.0);
//! streamer.flush();
//!
//! assert_eq!(streamer.stats().loaded, 25);
//! assert!(!streamer.events().is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod noise;
pub mod streamer;

pub use cache::CellCache;
pub use config::{ChunkConfig, GenerationConfig, StreamingConfig, WorldConfig};
pub use error::{ConfigError, WorldError, WorldResult};
pub use events::{ChunkEvent, EventQueue};
pub use generator::TerrainGenerator;
pub use noise::{FractalParams, NoiseField, SimplexNoise, WorldSeed};
pub use streamer::{TickReport, WorldStats, WorldStreamer};
