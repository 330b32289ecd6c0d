//! # Materials and Cells
//!
//! A cell is one byte: its material tag. Everything else about a material
//! (solidity, textures, tint) lives in the [`MATERIALS`] table and is looked
//! up by id, never dispatched on.

use bytemuck::NoUninit;

/// Material tag of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, NoUninit)]
#[repr(u8)]
pub enum Material {
    /// Empty space.
    #[default]
    Air = 0,
    /// Subsurface fill.
    Dirt = 1,
    /// Surface above the water line.
    Grass = 2,
    /// Shoreline surface exactly at the water line.
    Sand = 3,
    /// Surface below the water line.
    Water = 4,
}

impl Material {
    /// Number of materials in the table.
    pub const COUNT: usize = 5;

    /// Looks up a material by its numeric id.
    #[inline]
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Air),
            1 => Some(Self::Dirt),
            2 => Some(Self::Grass),
            3 => Some(Self::Sand),
            4 => Some(Self::Water),
            _ => None,
        }
    }

    /// Returns the numeric id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns this material's table entry.
    #[inline]
    #[must_use]
    pub fn info(self) -> &'static MaterialInfo {
        &MATERIALS[self as usize]
    }

    /// Returns true for anything but air.
    #[inline]
    #[must_use]
    pub fn is_solid(self) -> bool {
        self.info().solid
    }
}

/// Static properties of a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialInfo {
    /// Human-readable name.
    pub name: &'static str,
    /// Whether the cell occludes its neighbors' faces.
    pub solid: bool,
    /// Texture layer for top and bottom faces.
    pub top_texture: u16,
    /// Texture layer for side faces.
    pub side_texture: u16,
    /// Flat RGBA tint.
    pub color: [u8; 4],
}

/// Material table, indexed by material id.
pub static MATERIALS: [MaterialInfo; Material::COUNT] = [
    MaterialInfo {
        name: "air",
        solid: false,
        top_texture: 0,
        side_texture: 0,
        color: [0, 0, 0, 0],
    },
    MaterialInfo {
        name: "dirt",
        solid: true,
        top_texture: 1,
        side_texture: 1,
        color: [134, 96, 67, 255],
    },
    MaterialInfo {
        name: "grass",
        solid: true,
        top_texture: 2,
        side_texture: 3,
        color: [96, 160, 64, 255],
    },
    MaterialInfo {
        name: "sand",
        solid: true,
        top_texture: 4,
        side_texture: 4,
        color: [219, 203, 145, 255],
    },
    MaterialInfo {
        name: "water",
        solid: true,
        top_texture: 5,
        side_texture: 5,
        color: [64, 110, 200, 200],
    },
];

/// A single voxel slot inside a chunk volume.
///
/// Cells have no identity beyond their index; they are created, overwritten
/// and cleared only as part of their chunk's array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(transparent)]
pub struct Cell {
    material: Material,
}

impl Cell {
    /// Empty cell.
    pub const AIR: Self = Self::new(Material::Air);

    /// Creates a cell of the given material.
    #[inline]
    #[must_use]
    pub const fn new(material: Material) -> Self {
        Self { material }
    }

    /// Returns the material tag.
    #[inline]
    #[must_use]
    pub const fn material(self) -> Material {
        self.material
    }

    /// Returns true if the cell occludes faces.
    #[inline]
    #[must_use]
    pub fn is_solid(self) -> bool {
        self.material.is_solid()
    }
}

impl From<Material> for Cell {
    fn from(material: Material) -> Self {
        Self::new(material)
    }
}
