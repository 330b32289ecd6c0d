//! # Hex Coordinates
//!
//! Pointy-top hexagons on an "odd-r" layout: every odd row is shifted by one
//! apothem along +x. Rows run along the z axis.
//!
//! ## Coordinate Spaces
//!
//! - **Axial** `(q, r)`: neighbor math is a constant delta per direction.
//! - **Offset** `(col, row)`: what dense chunk arrays are indexed by. Neighbor
//!   deltas depend on row parity because of the staggering.
//!
//! ```text
//!        NW   NE            corner 0 points north (+z)
//!         \   /             edge i joins corner i and corner i + 1
//!     W -- hex -- E         direction i is the neighbor across edge i
//!         /   \
//!        SW   SE
//! ```

use std::f32::consts::FRAC_PI_6;

/// One of the six neighbor directions of a hex cell.
///
/// Numbered clockwise on a north-up map, starting at north-east. Direction `i`
/// is the side between hex corners `i` and `i + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum HexDirection {
    /// Up-right.
    NorthEast = 0,
    /// Right.
    East = 1,
    /// Down-right.
    SouthEast = 2,
    /// Down-left.
    SouthWest = 3,
    /// Left.
    West = 4,
    /// Up-left.
    NorthWest = 5,
}

impl HexDirection {
    /// All directions in rotational order.
    pub const ALL: [Self; 6] = [
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Returns the direction with the given rotational index (taken mod 6).
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

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
        Self::from_index(self.index() + 3)
    }

    /// Axial `(dq, dr)` delta of this direction.
    #[inline]
    #[must_use]
    pub const fn axial_delta(self) -> (i32, i32) {
        match self {
            Self::NorthEast => (0, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::SouthWest => (0, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
        }
    }

    /// Offset-space `(dcol, drow)` delta of this direction for a cell on a
    /// row of the given parity.
    ///
    /// Odd rows sit half a cell further east, so their diagonal neighbors are
    /// one column further east than those of even rows.
    #[inline]
    #[must_use]
    pub const fn offset_delta(self, odd_row: bool) -> (i32, i32) {
        match (self, odd_row) {
            (Self::NorthEast, false) => (0, 1),
            (Self::NorthEast, true) => (1, 1),
            (Self::East, _) => (1, 0),
            (Self::SouthEast, false) => (0, -1),
            (Self::SouthEast, true) => (1, -1),
            (Self::SouthWest, false) => (-1, -1),
            (Self::SouthWest, true) => (0, -1),
            (Self::West, _) => (-1, 0),
            (Self::NorthWest, false) => (-1, 1),
            (Self::NorthWest, true) => (0, 1),
        }
    }
}

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCoord {
    /// Axial column.
    pub q: i32,
    /// Axial row (same as the offset row).
    pub r: i32,
}

impl HexCoord {
    /// Creates a new axial coordinate.
    #[inline]
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Converts an offset `(col, row)` pair to axial.
    #[inline]
    #[must_use]
    pub const fn from_offset(col: i32, row: i32) -> Self {
        Self {
            q: col - row.div_euclid(2),
            r: row,
        }
    }

    /// Converts to an offset `(col, row)` pair.
    #[inline]
    #[must_use]
    pub const fn to_offset(self) -> (i32, i32) {
        (self.q + self.r.div_euclid(2), self.r)
    }

    /// Returns the neighboring coordinate in `direction`.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Self {
        let (dq, dr) = direction.axial_delta();
        Self {
            q: self.q + dq,
            r: self.r + dr,
        }
    }

    /// Returns all six neighbors in rotational order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        HexDirection::ALL.map(|direction| self.neighbor(direction))
    }

    /// Hex (step) distance between two coordinates.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        let ds = -dq - dr;
        (dq.unsigned_abs() + dr.unsigned_abs() + ds.unsigned_abs()) / 2
    }

    /// World-space `(x, z)` of the hex center.
    #[must_use]
    pub fn world_position(self, metrics: &HexMetrics) -> (f32, f32) {
        let x = metrics.apothem * (2.0 * self.q as f32 + self.r as f32);
        let z = metrics.row_spacing() * self.r as f32;
        (x, z)
    }

    /// Returns the hex containing the world-space point `(x, z)`.
    ///
    /// Converts to fractional cube coordinates and rounds, fixing up the
    /// component with the largest rounding error so `q + r + s == 0` holds.
    #[must_use]
    pub fn from_world_position(x: f32, z: f32, metrics: &HexMetrics) -> Self {
        let r = z / metrics.row_spacing();
        let q = x / (2.0 * metrics.apothem) - r * 0.5;
        let s = -q - r;

        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let dq = (rq - q).abs();
        let dr = (rr - r).abs();
        let ds = (rs - s).abs();

        if dq > dr && dq > ds {
            rq = -rr - rs;
        } else if dr > ds {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }
}

/// Geometry of a single hexagonal prism cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexMetrics {
    /// Center-to-corner distance.
    pub radius: f32,
    /// Center-to-edge distance (`radius * cos 30°`).
    pub apothem: f32,
    /// Height of one cell layer.
    pub cell_height: f32,
}

impl HexMetrics {
    /// Default corner radius.
    pub const DEFAULT_RADIUS: f32 = 1.0;
    /// Default layer height.
    pub const DEFAULT_CELL_HEIGHT: f32 = 1.0;

    /// Creates metrics for the given radius and layer height.
    #[must_use]
    pub fn new(radius: f32, cell_height: f32) -> Self {
        Self {
            radius,
            apothem: radius * FRAC_PI_6.cos(),
            cell_height,
        }
    }

    /// Distance between the centers of two cells on the same row.
    #[inline]
    #[must_use]
    pub fn column_spacing(&self) -> f32 {
        2.0 * self.apothem
    }

    /// Distance between two consecutive rows.
    #[inline]
    #[must_use]
    pub fn row_spacing(&self) -> f32 {
        1.5 * self.radius
    }

    /// Horizontal corner offsets `(x, z)` from the cell center.
    ///
    /// Corner 0 points north; the rest follow clockwise on a north-up map.
    #[must_use]
    pub fn corners(&self) -> [(f32, f32); 6] {
        let (a, r) = (self.apothem, self.radius);
        [
            (0.0, r),
            (a, 0.5 * r),
            (a, -0.5 * r),
            (0.0, -r),
            (-a, -0.5 * r),
            (-a, 0.5 * r),
        ]
    }

    /// Position of the bottom-center of the cell at offset `(col, row)` and
    /// layer `y`, relative to the origin of offset `(0, 0)`.
    #[inline]
    #[must_use]
    pub fn cell_base(&self, col: i32, y: usize, row: i32) -> [f32; 3] {
        let stagger = if row.rem_euclid(2) == 1 { self.apothem } else { 0.0 };
        [
            col as f32 * self.column_spacing() + stagger,
            y as f32 * self.cell_height,
            row as f32 * self.row_spacing(),
        ]
    }
}

impl Default for HexMetrics {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS, Self::DEFAULT_CELL_HEIGHT)
    }
}
