//! # Hex Prism Mesher
//!
//! Extracts the visible surface of a chunk: one polygon for every boundary
//! between a solid cell and an empty one, none inside solid mass.
//!
//! ## Faces
//!
//! - **Top**: 6-triangle fan, emitted at the topmost layer or under air.
//! - **Bottom**: 6-triangle fan, emitted above air. Never at layer 0.
//! - **Sides**: one quad (2 triangles) per hex edge facing an empty cell.
//!
//! ## Chunk Boundaries
//!
//! Side neighbors that fall outside the chunk are read from the matching
//! neighbor volume. A missing neighbor counts as solid, so nothing is drawn
//! against unloaded space; once the neighbor streams in, both chunks are
//! re-meshed and the faces appear.
//!
//! Winding is counter-clockwise seen from outside the solid. Vertices are
//! relative to the chunk origin and not welded across faces.

use bytemuck::{Pod, Zeroable};

use crate::chunk::{ChunkDirection, ChunkVolume};
use crate::hex::{HexDirection, HexMetrics};

/// Mesh vertex, laid out for direct upload to a vertex buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position relative to the chunk origin `[x, y, z]`.
    pub position: [f32; 3],
    /// Outward face normal `[nx, ny, nz]`.
    pub normal: [f32; 3],
    /// Material id of the cell the face belongs to.
    pub material: u32,
    /// Texture layer of the face (top or side texture of the material).
    pub texture: u32,
}

/// Triangulated surface of one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Index buffer, three indices per triangle.
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns true if nothing is visible.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex positions, in vertex-buffer order.
    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.iter().map(|vertex| vertex.position)
    }

    /// Material id of each triangle, in index-buffer order.
    pub fn triangle_materials(&self) -> impl Iterator<Item = u32> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|triangle| self.vertices[triangle[0] as usize].material)
    }

    /// Vertex data as raw bytes.
    #[inline]
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Empties both buffers, keeping their capacity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    fn push_fan(
        &mut self,
        center: [f32; 3],
        ring: &[[f32; 3]; 6],
        normal: [f32; 3],
        tag: FaceTag,
        upward: bool,
    ) {
        let base = self.vertices.len() as u32;
        self.vertices.push(tag.vertex(center, normal));
        self.vertices
            .extend(ring.iter().map(|&corner| tag.vertex(corner, normal)));
        for i in 0..6u32 {
            let a = base + 1 + i;
            let b = base + 1 + (i + 1) % 6;
            if upward {
                self.indices.extend_from_slice(&[base, a, b]);
            } else {
                self.indices.extend_from_slice(&[base, b, a]);
            }
        }
    }

    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], tag: FaceTag) {
        // corners: bottom_i, bottom_i+1, top_i+1, top_i
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.iter().map(|&corner| tag.vertex(corner, normal)));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[derive(Clone, Copy)]
struct FaceTag {
    material: u32,
    texture: u32,
}

impl FaceTag {
    #[inline]
    fn vertex(self, position: [f32; 3], normal: [f32; 3]) -> MeshVertex {
        MeshVertex {
            position,
            normal,
            material: self.material,
            texture: self.texture,
        }
    }
}

/// Borrowed cell volumes of the chunks around the one being meshed.
///
/// Any slot may be empty; a missing neighbor is treated as solid.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkNeighbors<'a> {
    volumes: [Option<&'a ChunkVolume>; 6],
}

impl<'a> ChunkNeighbors<'a> {
    /// No neighbors loaded.
    #[must_use]
    pub const fn none() -> Self {
        Self { volumes: [None; 6] }
    }

    /// Builds neighbors from a lookup, called once per direction.
    pub fn from_fn(mut lookup: impl FnMut(ChunkDirection) -> Option<&'a ChunkVolume>) -> Self {
        Self {
            volumes: ChunkDirection::ALL.map(&mut lookup),
        }
    }

    /// Returns a copy with the neighbor in `direction` set.
    #[must_use]
    pub fn with(mut self, direction: ChunkDirection, volume: &'a ChunkVolume) -> Self {
        self.volumes[direction as usize] = Some(volume);
        self
    }

    /// Neighbor volume in `direction`, if loaded.
    #[inline]
    #[must_use]
    pub const fn get(&self, direction: ChunkDirection) -> Option<&'a ChunkVolume> {
        self.volumes[direction as usize]
    }

    /// Number of neighbors supplied.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.volumes.iter().flatten().count()
    }
}

/// Triangulates a chunk's cells against its neighbors.
///
/// Pure function: the output depends only on the arguments, so re-meshing a
/// chunk whose neighbors did not change yields identical geometry.
#[must_use]
pub fn triangulate(
    volume: &ChunkVolume,
    neighbors: &ChunkNeighbors<'_>,
    metrics: &HexMetrics,
) -> ChunkMesh {
    let mut mesh = ChunkMesh::default();
    triangulate_into(volume, neighbors, metrics, &mut mesh);
    mesh
}

/// Same as [`triangulate`], reusing the buffers of `mesh`.
pub fn triangulate_into(
    volume: &ChunkVolume,
    neighbors: &ChunkNeighbors<'_>,
    metrics: &HexMetrics,
    mesh: &mut ChunkMesh,
) {
    mesh.clear();
    let dims = volume.dims();
    debug_assert!(
        ChunkDirection::ALL
            .iter()
            .filter_map(|&d| neighbors.get(d))
            .all(|n| n.dims() == dims),
        "neighbor chunk dimensions differ"
    );

    let corners = metrics.corners();
    let side_normals = side_normals(&corners);
    let top_y = dims.height() - 1;

    for y in 0..dims.height() {
        for z in 0..dims.length() {
            for x in 0..dims.width() {
                let material = volume.material_at(x, y, z);
                if !material.is_solid() {
                    continue;
                }
                let info = material.info();
                let cap = FaceTag {
                    material: u32::from(material.id()),
                    texture: u32::from(info.top_texture),
                };
                let side = FaceTag {
                    material: u32::from(material.id()),
                    texture: u32::from(info.side_texture),
                };

                let base = metrics.cell_base(x as i32, y, z as i32);
                let bottom = ring(base, &corners, 0.0);
                let top = ring(base, &corners, metrics.cell_height);

                if y == top_y || !volume.is_solid_at(x, y + 1, z) {
                    let center = [base[0], base[1] + metrics.cell_height, base[2]];
                    mesh.push_fan(center, &top, [0.0, 1.0, 0.0], cap, true);
                }
                if y > 0 && !volume.is_solid_at(x, y - 1, z) {
                    mesh.push_fan(base, &bottom, [0.0, -1.0, 0.0], cap, false);
                }

                for direction in HexDirection::ALL {
                    if side_occluded(volume, neighbors, x, y, z, direction) {
                        continue;
                    }
                    let i = direction.index();
                    let j = (i + 1) % 6;
                    mesh.push_quad([bottom[i], bottom[j], top[j], top[i]], side_normals[i], side);
                }
            }
        }
    }
}

/// Returns true if the side of cell `(x, y, z)` facing `direction` is hidden.
fn side_occluded(
    volume: &ChunkVolume,
    neighbors: &ChunkNeighbors<'_>,
    x: usize,
    y: usize,
    z: usize,
    direction: HexDirection,
) -> bool {
    let dims = volume.dims();
    let (dc, dr) = direction.offset_delta(z % 2 == 1);
    let nx = x as i32 + dc;
    let nz = z as i32 + dr;

    let chunk_dx = step_out(nx, dims.width());
    let chunk_dz = step_out(nz, dims.length());
    if chunk_dx == 0 && chunk_dz == 0 {
        return volume.is_solid_at(nx as usize, y, nz as usize);
    }

    // Always Some with an even chunk length
    let Some(chunk_direction) = ChunkDirection::from_offset(chunk_dx, chunk_dz) else {
        return true;
    };
    match neighbors.get(chunk_direction) {
        Some(neighbor) => {
            let lx = nx.rem_euclid(dims.width() as i32) as usize;
            let lz = nz.rem_euclid(dims.length() as i32) as usize;
            neighbor.is_solid_at(lx, y, lz)
        }
        None => true,
    }
}

#[inline]
fn step_out(index: i32, size: usize) -> i32 {
    if index < 0 {
        -1
    } else if index >= size as i32 {
        1
    } else {
        0
    }
}

#[inline]
fn ring(base: [f32; 3], corners: &[(f32, f32); 6], lift: f32) -> [[f32; 3]; 6] {
    corners.map(|(cx, cz)| [base[0] + cx, base[1] + lift, base[2] + cz])
}

fn side_normals(corners: &[(f32, f32); 6]) -> [[f32; 3]; 6] {
    std::array::from_fn(|i| {
        let (ax, az) = corners[i];
        let (bx, bz) = corners[(i + 1) % 6];
        let (mx, mz) = ((ax + bx) * 0.5, (az + bz) * 0.5);
        let len = (mx * mx + mz * mz).sqrt();
        [mx / len, 0.0, mz / len]
    })
}

/// Counts the faces [`triangulate`] would emit, without building geometry.
#[must_use]
pub fn count_visible_faces(volume: &ChunkVolume, neighbors: &ChunkNeighbors<'_>) -> usize {
    let dims = volume.dims();
    let mut faces = 0;
    for y in 0..dims.height() {
        for z in 0..dims.length() {
            for x in 0..dims.width() {
                if !volume.is_solid_at(x, y, z) {
                    continue;
                }
                if y == dims.height() - 1 || !volume.is_solid_at(x, y + 1, z) {
                    faces += 1;
                }
                if y > 0 && !volume.is_solid_at(x, y - 1, z) {
                    faces += 1;
                }
                faces += HexDirection::ALL
                    .iter()
                    .filter(|&&d| !side_occluded(volume, neighbors, x, y, z, d))
                    .count();
            }
        }
    }
    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkDims;
    use crate::material::{Cell, Material};

    fn dims() -> ChunkDims {
        ChunkDims::new(4, 4, 4).unwrap()
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn test_watertight_solid_block() {
        let dims = dims();
        let solid = ChunkVolume::filled(dims, Material::Dirt);
        let neighbors = ChunkNeighbors::from_fn(|_| Some(&solid));

        let mesh = triangulate(&solid, &neighbors, &HexMetrics::default());

        // Only the top layer is exposed
        assert_eq!(mesh.triangle_count(), dims.width() * dims.length() * 6);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_no_faces_between_solid_cells() {
        let dims = dims();
        let mut volume = ChunkVolume::filled(dims, Material::Dirt);
        // Open the top layer so no cell reaches the ceiling
        for x in 0..dims.width() {
            for z in 0..dims.length() {
                volume.set(x, dims.height() - 1, z, Cell::AIR).unwrap();
            }
        }
        let solid = ChunkVolume::filled(dims, Material::Dirt);
        let neighbors = ChunkNeighbors::from_fn(|_| Some(&solid));

        // Only the caps of the highest solid layer face air
        assert_eq!(count_visible_faces(&volume, &neighbors), dims.width() * dims.length());
    }

    #[test]
    fn test_single_cell_full_exposure() {
        let mut volume = ChunkVolume::new(dims());
        volume.set(1, 1, 1, Cell::new(Material::Grass)).unwrap();

        let mesh = triangulate(&volume, &ChunkNeighbors::none(), &HexMetrics::default());

        // Top fan (6) + bottom fan (6) + six side quads (12)
        assert_eq!(mesh.triangle_count(), 24);
        assert_eq!(count_visible_faces(&volume, &ChunkNeighbors::none()), 8);
        assert!(mesh.triangle_materials().all(|m| m == u32::from(Material::Grass.id())));

        let info = Material::Grass.info();
        let side_faces = mesh
            .vertices
            .iter()
            .filter(|v| v.texture == u32::from(info.side_texture))
            .count();
        assert_eq!(side_faces, 6 * 4);
    }

    #[test]
    fn test_ground_layer_has_no_bottom() {
        let mut volume = ChunkVolume::new(dims());
        volume.set(1, 0, 1, Cell::new(Material::Dirt)).unwrap();
        let mesh = triangulate(&volume, &ChunkNeighbors::none(), &HexMetrics::default());
        assert_eq!(mesh.triangle_count(), 18);
        assert!(mesh.vertices.iter().all(|v| v.normal[1] >= 0.0));
    }

    #[test]
    fn test_winding_faces_outward() {
        let mut volume = ChunkVolume::new(dims());
        volume.set(1, 1, 2, Cell::new(Material::Sand)).unwrap();
        let mesh = triangulate(&volume, &ChunkNeighbors::none(), &HexMetrics::default());

        for triangle in mesh.indices.chunks_exact(3) {
            let a = mesh.vertices[triangle[0] as usize];
            let b = mesh.vertices[triangle[1] as usize];
            let c = mesh.vertices[triangle[2] as usize];
            let n = cross(sub(b.position, a.position), sub(c.position, a.position));
            let dot = n[0] * a.normal[0] + n[1] * a.normal[1] + n[2] * a.normal[2];
            assert!(dot > 0.0, "triangle {triangle:?} winds inward");
        }
    }

    #[test]
    fn test_boundary_face_against_empty_neighbor() {
        let dims = dims();
        let mut a = ChunkVolume::new(dims);
        // Easternmost column of A, even row
        a.set(dims.width() - 1, 1, 0, Cell::new(Material::Dirt)).unwrap();
        let east = ChunkVolume::new(dims);

        let with_east = ChunkNeighbors::none().with(ChunkDirection::East, &east);
        let faces_with = count_visible_faces(&a, &with_east);
        let faces_absent = count_visible_faces(&a, &ChunkNeighbors::none());

        // East face is drawn only when the empty neighbor is actually loaded
        assert_eq!(faces_with, faces_absent + 1);
    }

    #[test]
    fn test_absent_neighbor_is_opaque() {
        let dims = dims();
        let mut volume = ChunkVolume::new(dims);
        // Corner cell on the odd top row: NE, E, SE and NW leave the chunk
        volume
            .set(dims.width() - 1, 1, dims.length() - 1, Cell::new(Material::Dirt))
            .unwrap();

        let alone = count_visible_faces(&volume, &ChunkNeighbors::none());
        // Top, bottom, and the SW and W sides that stay inside the chunk
        assert_eq!(alone, 4);

        let empty = ChunkVolume::new(dims);
        let all_empty = ChunkNeighbors::from_fn(|_| Some(&empty));
        assert_eq!(count_visible_faces(&volume, &all_empty), 8);
    }

    #[test]
    fn test_row_parity_across_chunk_edge() {
        let dims = dims();
        let mut volume = ChunkVolume::new(dims);
        // Even bottom row at x = 0: SW crosses into the south-west chunk,
        // SE into the south chunk
        volume.set(0, 1, 0, Cell::new(Material::Dirt)).unwrap();

        let mut south_west = ChunkVolume::new(dims);
        let solid_south = ChunkVolume::filled(dims, Material::Dirt);
        // Fill south-west fully except the one cell the SW face looks at
        for x in 0..dims.width() {
            for z in 0..dims.length() {
                south_west.set(x, 1, z, Cell::new(Material::Dirt)).unwrap();
            }
        }
        south_west
            .set(dims.width() - 1, 1, dims.length() - 1, Cell::AIR)
            .unwrap();

        let neighbors = ChunkNeighbors::none()
            .with(ChunkDirection::SouthWest, &south_west)
            .with(ChunkDirection::South, &solid_south);
        let empty_sw = count_visible_faces(&volume, &neighbors);

        south_west
            .set(dims.width() - 1, 1, dims.length() - 1, Cell::new(Material::Dirt))
            .unwrap();
        let neighbors = ChunkNeighbors::none()
            .with(ChunkDirection::SouthWest, &south_west)
            .with(ChunkDirection::South, &solid_south);
        let solid_sw = count_visible_faces(&volume, &neighbors);

        assert_eq!(empty_sw, solid_sw + 1);
    }

    #[test]
    fn test_retriangulation_is_idempotent() {
        let dims = dims();
        let mut volume = ChunkVolume::new(dims);
        for x in 0..dims.width() {
            for z in 0..dims.length() {
                let h = (x + z) % dims.height();
                volume.fill_column(x, z, h, Material::Dirt, Material::Grass).unwrap();
            }
        }
        let east = ChunkVolume::filled(dims, Material::Dirt);
        let neighbors = ChunkNeighbors::none().with(ChunkDirection::East, &east);
        let metrics = HexMetrics::new(1.3, 0.7);

        let first = triangulate(&volume, &neighbors, &metrics);
        let mut second = ChunkMesh::default();
        triangulate_into(&volume, &neighbors, &metrics, &mut second);
        triangulate_into(&volume, &neighbors, &metrics, &mut second);
        assert_eq!(first, second);
        assert_eq!(first.vertex_bytes(), second.vertex_bytes());
    }
}
