use crate::{
    config::GridLayout,
    section::{LocalMeshIndex, SectionIndex, SectionShape, SubMeshKey, SECTION_EDGE_MESHES},
    units::*,
};

use ndshape::ConstShape;
use wmedit_core::glam::{IVec2, Vec3};

/// Edge length of one sub-mesh in raw map units.
pub const SUB_MESH_SIZE: i32 = 8192;

/// Absolute position of a sub-mesh in the world grid.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GridCoords {
    pub row: usize,
    pub column: usize,
}

impl GridCoords {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// The grid cell occupied by sub-mesh `key`.
pub fn cell_of(layout: GridLayout, key: SubMeshKey) -> GridCoords {
    let section_row = key.section / layout.sections_x;
    let section_col = key.section % layout.sections_x;
    let [local_col, local_row] = key.local_coords();
    GridCoords {
        row: section_row * SECTION_EDGE_MESHES + local_row as usize,
        column: section_col * SECTION_EDGE_MESHES + local_col as usize,
    }
}

/// Inverse of [`cell_of`]. Returns `None` for cells outside of `layout`.
pub fn key_of(layout: GridLayout, coords: GridCoords) -> Option<SubMeshKey> {
    if coords.row >= layout.rows() || coords.column >= layout.columns() {
        return None;
    }
    let section: SectionIndex = (coords.row / SECTION_EDGE_MESHES) * layout.sections_x
        + coords.column / SECTION_EDGE_MESHES;
    let local = SectionShape::linearize([
        (coords.column % SECTION_EDGE_MESHES) as u32,
        (coords.row % SECTION_EDGE_MESHES) as u32,
    ]);
    Some(SubMeshKey::new(section, local as LocalMeshIndex))
}

/// World-space offset of the sub-mesh at `coords`, as `(x, z)` in raw map units.
pub fn mesh_offset(coords: GridCoords) -> IVec2 {
    IVec2::new(
        coords.column as i32 * SUB_MESH_SIZE,
        coords.row as i32 * SUB_MESH_SIZE,
    )
}

/// Inverse of [`mesh_offset`]. Offsets are always non-negative multiples of [`SUB_MESH_SIZE`] for materialized triangles.
pub fn coords_from_offset(offset: IVec2) -> GridCoords {
    GridCoords {
        row: (offset.y / SUB_MESH_SIZE).max(0) as usize,
        column: (offset.x / SUB_MESH_SIZE).max(0) as usize,
    }
}

pub fn local_to_global(local: LocalUnits<Vec3>, coords: GridCoords, scale: f32) -> GlobalUnits<Vec3> {
    let offset = mesh_offset(coords).as_vec2();
    let LocalUnits(p) = local;
    GlobalUnits(Vec3::new(p.x + offset.x, p.y, p.z + offset.y) * scale)
}

pub fn global_to_local(global: GlobalUnits<Vec3>, coords: GridCoords, scale: f32) -> LocalUnits<Vec3> {
    let offset = mesh_offset(coords).as_vec2();
    let p = global.0 / scale;
    LocalUnits(Vec3::new(p.x - offset.x, p.y, p.z - offset.y))
}

/// The grid cell whose footprint contains `global`, ignoring height. May lie outside of the map.
pub fn containing_cell(global: GlobalUnits<Vec3>, scale: f32) -> Option<GridCoords> {
    let p = global.0 / scale;
    if p.x < 0.0 || p.z < 0.0 {
        return None;
    }
    let size = SUB_MESH_SIZE as f32;
    Some(GridCoords {
        row: (p.z / size) as usize,
        column: (p.x / size) as usize,
    })
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
