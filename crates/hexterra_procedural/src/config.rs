//! # World Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file) yields a playable world.
//!
//! ```toml
//! [generation]
//! seed = 1337
//! octaves = 4
//! base_frequency = 0.05
//! frequency_falloff = 2.0
//! amplitude_falloff = 0.5
//! water_level = 12
//!
//! [chunk]
//! width = 16
//! height = 64
//! length = 16
//!
//! [streaming]
//! render_distance = 5
//! ```
//!
//! Invalid values are rejected, never clamped.

use std::path::Path;

use hexterra_core::{ChunkDims, HexMetrics};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::noise::{FractalParams, WorldSeed};

/// Complete world configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Terrain shape.
    pub generation: GenerationConfig,
    /// Chunk size and cell geometry.
    pub chunk: ChunkConfig,
    /// Loading window and per-tick budgets.
    pub streaming: StreamingConfig,
}

/// Terrain shape parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// World seed.
    pub seed: u64,
    /// Detail noise layers.
    pub octaves: u32,
    /// Frequency of the first detail layer, per world unit.
    pub base_frequency: f64,
    /// Frequency multiplier per layer.
    pub frequency_falloff: f64,
    /// Amplitude multiplier per layer.
    pub amplitude_falloff: f64,
    /// Surface layer at which grass turns into sand, and below which water.
    pub water_level: usize,
    /// Frequency of the large-scale landform envelope.
    pub envelope_frequency: f64,
    /// Sharpness of the envelope (1.0 = linear).
    pub envelope_exponent: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            octaves: 4,
            base_frequency: 0.05,
            frequency_falloff: 2.0,
            amplitude_falloff: 0.5,
            water_level: 12,
            envelope_frequency: 0.01,
            envelope_exponent: 1.2,
        }
    }
}

impl GenerationConfig {
    /// World seed.
    #[inline]
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        WorldSeed::new(self.seed)
    }

    /// Detail noise parameters.
    #[must_use]
    pub const fn detail_params(&self) -> FractalParams {
        FractalParams {
            octaves: self.octaves,
            frequency: self.base_frequency,
            lacunarity: self.frequency_falloff,
            persistence: self.amplitude_falloff,
        }
    }

    /// Envelope noise parameters (one layer).
    #[must_use]
    pub const fn envelope_params(&self) -> FractalParams {
        FractalParams::single(self.envelope_frequency)
    }
}

/// Chunk size and cell geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkConfig {
    /// Columns per chunk.
    pub width: usize,
    /// Layers per chunk.
    pub height: usize,
    /// Rows per chunk. Must be even.
    pub length: usize,
    /// Hex corner radius in world units.
    pub hex_radius: f32,
    /// Layer height in world units.
    pub cell_height: f32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            width: ChunkDims::DEFAULT_SIZE,
            height: ChunkDims::DEFAULT_HEIGHT,
            length: ChunkDims::DEFAULT_SIZE,
            hex_radius: HexMetrics::DEFAULT_RADIUS,
            cell_height: HexMetrics::DEFAULT_CELL_HEIGHT,
        }
    }
}

/// Loading window and per-tick budgets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingConfig {
    /// Chebyshev radius, in chunks, of the loaded window.
    pub render_distance: i32,
    /// Chunk creations per tick.
    pub chunks_per_tick: usize,
    /// Re-triangulations per tick.
    pub meshes_per_tick: usize,
    /// Evicted chunks kept in memory for instant reload. 0 disables.
    pub cache_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 5,
            chunks_per_tick: 1,
            meshes_per_tick: 4,
            cache_capacity: 256,
        }
    }
}

impl StreamingConfig {
    /// Render distance as a chunk count. Zero if validation was skipped.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> u32 {
        u32::try_from(self.render_distance).unwrap_or(0)
    }
}

impl WorldConfig {
    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] on malformed TOML and [`ConfigError::Invalid`]
    /// if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            seed = config.generation.seed,
            render_distance = config.streaming.render_distance,
            "loaded world config"
        );
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if generation.octaves == 0 {
            return Err(ConfigError::invalid("generation.octaves", "must be at least 1"));
        }
        positive("generation.base_frequency", generation.base_frequency)?;
        positive("generation.frequency_falloff", generation.frequency_falloff)?;
        positive("generation.amplitude_falloff", generation.amplitude_falloff)?;
        positive("generation.envelope_frequency", generation.envelope_frequency)?;
        if !generation.envelope_exponent.is_finite() || generation.envelope_exponent < 0.0 {
            return Err(ConfigError::invalid(
                "generation.envelope_exponent",
                format!("{} is not a finite, non-negative number", generation.envelope_exponent),
            ));
        }

        let dims = self.dims()?;
        if generation.water_level >= dims.height() {
            return Err(ConfigError::invalid(
                "generation.water_level",
                format!("{} must be below chunk height {}", generation.water_level, dims.height()),
            ));
        }
        positive("chunk.hex_radius", f64::from(self.chunk.hex_radius))?;
        positive("chunk.cell_height", f64::from(self.chunk.cell_height))?;

        let streaming = &self.streaming;
        if streaming.render_distance <= 0 {
            return Err(ConfigError::invalid(
                "streaming.render_distance",
                format!("{} must be positive", streaming.render_distance),
            ));
        }
        if streaming.chunks_per_tick == 0 {
            return Err(ConfigError::invalid("streaming.chunks_per_tick", "must be at least 1"));
        }
        if streaming.meshes_per_tick == 0 {
            return Err(ConfigError::invalid("streaming.meshes_per_tick", "must be at least 1"));
        }
        Ok(())
    }

    /// Validated chunk dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero dimension or odd length.
    pub fn dims(&self) -> Result<ChunkDims, ConfigError> {
        ChunkDims::new(self.chunk.width, self.chunk.height, self.chunk.length)
            .map_err(|err| ConfigError::invalid("chunk", err.to_string()))
    }

    /// Cell geometry.
    #[must_use]
    pub fn metrics(&self) -> HexMetrics {
        HexMetrics::new(self.chunk.hex_radius, self.chunk.cell_height)
    }

    /// Small, fast config for tests and demos: 8×32×8 chunks, radius 2.
    #[must_use]
    pub fn small() -> Self {
        Self {
            generation: GenerationConfig {
                water_level: 6,
                ..GenerationConfig::default()
            },
            chunk: ChunkConfig {
                width: 8,
                height: 32,
                length: 8,
                ..ChunkConfig::default()
            },
            streaming: StreamingConfig {
                render_distance: 2,
                chunks_per_tick: 2,
                meshes_per_tick: 8,
                cache_capacity: 64,
            },
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} is not a finite, positive number"),
        ))
    }
}
