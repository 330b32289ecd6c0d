//! # Simplex Noise
//!
//! Seeded, deterministic gradient noise in 2D and 3D.
//!
//! ## Determinism Guarantee
//!
//! Given the same [`WorldSeed`], input and parameters, every sample is
//! bit-identical on every run. Evicted chunks rely on this to regenerate
//! exactly the terrain they had.
//!
//! ## Range
//!
//! Single samples and fractal sums both stay in `[-1, 1]`. Fractal sums are
//! divided by their total amplitude, so adding octaves adds detail without
//! widening the range.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for one purpose (detail, envelope...).
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0 ^ purpose.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        hash = hash.wrapping_mul(0x517C_C1B7_2722_0A95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x4845_5854_4552_5241)
    }
}

/// Continuous, deterministic noise over 2D and 3D space.
///
/// Implementors provide single-octave samples; fractal sums come for free.
pub trait NoiseField {
    /// Single-octave sample in `[-1, 1]`.
    fn sample_2d(&self, x: f64, y: f64) -> f64;

    /// Single-octave sample in `[-1, 1]`.
    fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64;

    /// Fractal sum of `params.octaves` layers, normalized to `[-1, 1]`.
    fn fractal_2d(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = params.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..params.octaves {
            total += self.sample_2d(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        if max_amplitude > 0.0 {
            (total / max_amplitude).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Fractal sum of `params.octaves` layers, normalized to `[-1, 1]`.
    fn fractal_3d(&self, x: f64, y: f64, z: f64, params: &FractalParams) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = params.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..params.octaves {
            total += self.sample_3d(x * frequency, y * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        if max_amplitude > 0.0 {
            (total / max_amplitude).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Parameters of a fractal noise sum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    /// Number of layers.
    pub octaves: u32,
    /// Frequency of the first layer.
    pub frequency: f64,
    /// Frequency multiplier per layer (typically 2.0).
    pub lacunarity: f64,
    /// Amplitude multiplier per layer (typically 0.5).
    pub persistence: f64,
}

impl FractalParams {
    /// A single layer at `frequency`.
    #[inline]
    #[must_use]
    pub const fn single(frequency: f64) -> Self {
        Self {
            octaves: 1,
            frequency,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 0.02,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

/// Pre-computed permutation table, built once per seed.
struct PermutationTable {
    /// 256 entries, doubled so `perm[i + perm[j]]` never wraps.
    perm: [u8; 512],
}

impl PermutationTable {
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates with xorshift64; a zero state would never move
        let mut rng_state = seed.value() ^ 0x2545_F491_4F6C_DD1D;
        if rng_state == 0 {
            rng_state = 0x2545_F491_4F6C_DD1D;
        }
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        perm.copy_within(0..256, 256);

        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// Gradients for 2D: the eight compass directions plus the axes again.
const GRAD2: [[f64; 2]; 12] = [
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    [-1.0, 1.0],
    [-1.0, 0.0],
    [-1.0, -1.0],
    [0.0, -1.0],
    [1.0, -1.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [-1.0, 0.0],
    [0.0, -1.0],
];

/// Gradients for 3D: midpoints of the cube edges.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Seeded simplex noise.
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
///
/// # Example
///
/// ```rust
/// use hexterra_procedural::noise::{NoiseField, SimplexNoise, WorldSeed};
///
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.sample_2d(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
pub struct SimplexNoise {
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D: `(sqrt(3) - 1) / 2`.
    const F2: f64 = 0.366_025_403_784_438_6;
    /// Unskewing factor for 2D: `(3 - sqrt(3)) / 6`.
    const G2: f64 = 0.211_324_865_405_187_1;
    /// Skewing factor for 3D.
    const F3: f64 = 1.0 / 3.0;
    /// Unskewing factor for 3D.
    const G3: f64 = 1.0 / 6.0;

    /// Creates a noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    #[inline]
    fn contribution_2d(x: f64, y: f64, hash: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRAD2[hash % 12];
            let t2 = t * t;
            t2 * t2 * (x * grad[0] + y * grad[1])
        }
    }

    #[inline]
    fn contribution_3d(x: f64, y: f64, z: f64, hash: usize) -> f64 {
        let t = 0.6 - x * x - y * y - z * z;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRAD3[hash % 12];
            let t2 = t * t;
            t2 * t2 * (x * grad[0] + y * grad[1] + z * grad[2])
        }
    }
}

impl NoiseField for SimplexNoise {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Lower or upper triangle of the skewed cell
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj));
        let gi1 = p.get(ii + i1 as usize + p.get(jj + j1 as usize));
        let gi2 = p.get(ii + 1 + p.get(jj + 1));

        let n = Self::contribution_2d(x0, y0, gi0)
            + Self::contribution_2d(x1, y1, gi1)
            + Self::contribution_2d(x2, y2, gi2);

        (70.0 * n).clamp(-1.0, 1.0)
    }

    fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let skew = (x + y + z) * Self::F3;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);
        let k = fast_floor(z + skew);

        let unskew = f64::from(i + j + k) * Self::G3;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);
        let z0 = z - (f64::from(k) - unskew);

        // Which of the six tetrahedra of the skewed cube we are in
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - f64::from(i1) + Self::G3;
        let y1 = y0 - f64::from(j1) + Self::G3;
        let z1 = z0 - f64::from(k1) + Self::G3;
        let x2 = x0 - f64::from(i2) + 2.0 * Self::G3;
        let y2 = y0 - f64::from(j2) + 2.0 * Self::G3;
        let z2 = z0 - f64::from(k2) + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj + p.get(kk)));
        let gi1 = p.get(ii + i1 as usize + p.get(jj + j1 as usize + p.get(kk + k1 as usize)));
        let gi2 = p.get(ii + i2 as usize + p.get(jj + j2 as usize + p.get(kk + k2 as usize)));
        let gi3 = p.get(ii + 1 + p.get(jj + 1 + p.get(kk + 1)));

        let n = Self::contribution_3d(x0, y0, z0, gi0)
            + Self::contribution_3d(x1, y1, z1, gi1)
            + Self::contribution_3d(x2, y2, z2, gi2)
            + Self::contribution_3d(x3, y3, z3, gi3);

        (32.0 * n).clamp(-1.0, 1.0)
    }
}

/// Maps a `[-1, 1]` noise value to `[0, 1]`.
#[inline]
#[must_use]
pub fn to_unit(value: f64) -> f64 {
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}
