//! # Terrain Generator
//!
//! Turns a chunk coordinate into a filled cell volume.
//!
//! ## Height Field
//!
//! Each column samples two noise fields at the world position of its hex:
//!
//! - **detail**: fractal noise, the local hills
//! - **envelope**: one slow layer, large-scale landforms
//!
//! `h = floor(detail · envelope^exponent · (height - 1))`. Cells below `h`
//! are dirt; the cell at `h` is grass above the water level, sand at it and
//! water below it.
//!
//! Generation never looks at another chunk, so chunks can be generated in
//! any order or on any thread.

use hexterra_core::{ChunkCoord, ChunkDims, ChunkVolume, ColumnFill, HexMetrics, Material};
use tracing::debug;

use crate::config::{GenerationConfig, WorldConfig};
use crate::error::ConfigError;
use crate::noise::{to_unit, FractalParams, NoiseField, SimplexNoise, WorldSeed};

/// Sub-seed purpose of the detail field.
const DETAIL_PURPOSE: u64 = 1;
/// Sub-seed purpose of the envelope field.
const ENVELOPE_PURPOSE: u64 = 2;

/// Deterministic height-field generator.
///
/// Generic over the noise source; the default is seeded simplex noise.
pub struct TerrainGenerator<N = SimplexNoise> {
    detail: N,
    envelope: N,
    detail_params: FractalParams,
    envelope_params: FractalParams,
    envelope_exponent: f64,
    water_level: usize,
    dims: ChunkDims,
    metrics: HexMetrics,
}

impl TerrainGenerator<SimplexNoise> {
    /// Creates a simplex generator from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the config does not validate.
    pub fn from_config(config: &WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(&config.generation, config.dims()?, config.metrics()))
    }

    /// Creates a simplex generator. Parameters are assumed validated.
    #[must_use]
    pub fn new(config: &GenerationConfig, dims: ChunkDims, metrics: HexMetrics) -> Self {
        let seed: WorldSeed = config.world_seed();
        Self::with_noise(
            SimplexNoise::new(seed.derive(DETAIL_PURPOSE)),
            SimplexNoise::new(seed.derive(ENVELOPE_PURPOSE)),
            config,
            dims,
            metrics,
        )
    }
}

impl<N: NoiseField> TerrainGenerator<N> {
    /// Creates a generator over caller-supplied noise fields.
    #[must_use]
    pub fn with_noise(
        detail: N,
        envelope: N,
        config: &GenerationConfig,
        dims: ChunkDims,
        metrics: HexMetrics,
    ) -> Self {
        Self {
            detail,
            envelope,
            detail_params: config.detail_params(),
            envelope_params: config.envelope_params(),
            envelope_exponent: config.envelope_exponent,
            water_level: config.water_level,
            dims,
            metrics,
        }
    }

    /// Chunk dimensions produced.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Cell geometry used to place samples.
    #[inline]
    #[must_use]
    pub const fn metrics(&self) -> &HexMetrics {
        &self.metrics
    }

    /// Normalized terrain height at a world-space point, in `[0, 1]`.
    #[must_use]
    pub fn height_fraction(&self, x: f64, z: f64) -> f64 {
        let detail = to_unit(self.detail.fractal_2d(x, z, &self.detail_params));
        let envelope = to_unit(self.envelope.fractal_2d(x, z, &self.envelope_params));
        (detail * envelope.powf(self.envelope_exponent)).clamp(0.0, 1.0)
    }

    /// Surface layer of the column at global offset cell `(col, row)`.
    #[must_use]
    pub fn column_height(&self, col: i32, row: i32) -> usize {
        let [x, _, z] = self.metrics.cell_base(col, 0, row);
        let fraction = self.height_fraction(f64::from(x), f64::from(z));
        let top = self.dims.height() - 1;
        ((fraction * top as f64).floor() as usize).min(top)
    }

    /// Material of the surface cell at layer `height`.
    #[inline]
    #[must_use]
    pub fn surface_material(&self, height: usize) -> Material {
        match height.cmp(&self.water_level) {
            std::cmp::Ordering::Greater => Material::Grass,
            std::cmp::Ordering::Equal => Material::Sand,
            std::cmp::Ordering::Less => Material::Water,
        }
    }

    /// Generates the cells of one chunk.
    #[must_use]
    pub fn generate(&self, coord: ChunkCoord) -> ChunkVolume {
        let mut volume = ChunkVolume::new(self.dims);
        self.generate_into(coord, &mut volume);
        volume
    }

    /// Generates into an existing volume, reusing its allocation.
    pub fn generate_into(&self, coord: ChunkCoord, volume: &mut ChunkVolume) {
        if volume.dims() != self.dims {
            volume.resize(self.dims);
        }
        let (col0, row0) = coord.first_cell(self.dims);
        volume.fill_columns(|x, z| {
            let surface_y = self.column_height(col0 + x as i32, row0 + z as i32);
            ColumnFill {
                surface_y,
                fill: Material::Dirt,
                surface: self.surface_material(surface_y),
            }
        });
        debug!(x = coord.x, z = coord.z, "generated chunk");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Constant noise, to pin heights exactly.
    struct Flat(f64);

    impl NoiseField for Flat {
        fn sample_2d(&self, _x: f64, _y: f64) -> f64 {
            self.0
        }

        fn sample_3d(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            self.0
        }
    }

    fn dims() -> ChunkDims {
        ChunkDims::new(4, 33, 4).unwrap()
    }

    fn flat(detail: f64, water_level: usize) -> TerrainGenerator<Flat> {
        let config = GenerationConfig {
            water_level,
            envelope_exponent: 1.0,
            ..GenerationConfig::default()
        };
        // Envelope of 1.0 maps to a unit multiplier
        TerrainGenerator::with_noise(Flat(detail), Flat(1.0), &config, dims(), HexMetrics::default())
    }

    #[test]
    fn test_column_layout() {
        // detail 0.0 -> fraction 0.5 -> h = floor(0.5 * 32) = 16
        let gen = flat(0.0, 10);
        assert_eq!(gen.column_height(0, 0), 16);

        let volume = gen.generate(ChunkCoord::new(0, 0));
        assert_eq!(volume.get(2, 0, 1).unwrap().material(), Material::Dirt);
        assert_eq!(volume.get(2, 15, 1).unwrap().material(), Material::Dirt);
        assert_eq!(volume.get(2, 16, 1).unwrap().material(), Material::Grass);
        assert_eq!(volume.get(2, 17, 1).unwrap().material(), Material::Air);
    }

    #[test]
    fn test_surface_material_by_water_level() {
        let gen = flat(0.0, 16);
        assert_eq!(gen.surface_material(17), Material::Grass);
        assert_eq!(gen.surface_material(16), Material::Sand);
        assert_eq!(gen.surface_material(15), Material::Water);

        let volume = gen.generate(ChunkCoord::new(3, -2));
        assert_eq!(volume.get(0, 16, 0).unwrap().material(), Material::Sand);
    }

    #[test]
    fn test_extreme_noise_stays_in_chunk() {
        let high = flat(1.0, 0);
        assert_eq!(high.column_height(5, 5), dims().height() - 1);
        let low = flat(-1.0, 0);
        assert_eq!(low.column_height(5, 5), 0);
        // Surface at layer 0 on the water line is sand
        let volume = low.generate(ChunkCoord::new(0, 0));
        assert_eq!(volume.get(0, 0, 0).unwrap().material(), Material::Sand);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = WorldConfig::small();
        let a = TerrainGenerator::from_config(&config).unwrap();
        let b = TerrainGenerator::from_config(&config).unwrap();
        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-4, 9), ChunkCoord::new(100, -100)] {
            assert_eq!(a.generate(coord).as_bytes(), b.generate(coord).as_bytes());
        }
    }

    #[test]
    fn test_generate_into_resizes_and_overwrites() {
        let config = WorldConfig::small();
        let gen = TerrainGenerator::from_config(&config).unwrap();
        let coord = ChunkCoord::new(1, 2);

        let mut reused = ChunkVolume::filled(ChunkDims::new(2, 2, 2).unwrap(), Material::Water);
        gen.generate_into(coord, &mut reused);
        assert_eq!(reused, gen.generate(coord));
    }

    #[test]
    fn test_neighboring_columns_agree_across_chunks() {
        let config = WorldConfig::small();
        let gen = TerrainGenerator::from_config(&config).unwrap();
        let dims = gen.dims();

        let west = gen.generate(ChunkCoord::new(0, 0));
        let east = gen.generate(ChunkCoord::new(1, 0));
        // Column heights are a function of the global cell only
        for z in 0..dims.length() {
            let expected = gen.column_height(dims.width() as i32, z as i32);
            assert_eq!(east.surface_height(0, z).unwrap(), Some(expected));
            let expected = gen.column_height(dims.width() as i32 - 1, z as i32);
            assert_eq!(west.surface_height(dims.width() - 1, z).unwrap(), Some(expected));
        }
    }
}
