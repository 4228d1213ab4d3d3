use crate::{
    config::GridLayout,
    coordinates::{cell_of, GridCoords},
    section::{SectionIndex, SubMeshKey, MESHES_PER_SECTION, SECTION_EDGE_MESHES},
    variant_cache::{SectionMeshes, SubMeshId},
};

/// # Mesh Grid
///
/// The assembled world: a row-major array of [`SubMeshId`]s with `sections_z * 4` rows and `sections_x * 4` columns.
///
/// Every row carries a version counter that is bumped whenever any of its cells is replaced. Consumers can compare versions to
/// detect which rows need to be rebuilt.
#[derive(Clone, Debug)]
pub struct MeshGrid {
    layout: GridLayout,
    cells: Vec<Option<SubMeshId>>,
    row_versions: Vec<u64>,
}

impl MeshGrid {
    /// An empty grid for `layout`.
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            cells: vec![None; layout.rows() * layout.columns()],
            row_versions: vec![0; layout.rows()],
        }
    }

    /// Places the meshes of each section, in ascending section order. `sections[s]` holds the meshes of section `s`.
    pub fn build(layout: GridLayout, sections: &[SectionMeshes]) -> Self {
        debug_assert!(sections.len() <= layout.num_sections());

        let mut grid = Self::new(layout);
        for (section, meshes) in sections.iter().enumerate() {
            grid.write_section(section, meshes);
        }
        grid
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn columns(&self) -> usize {
        self.layout.columns()
    }

    /// The mesh at `coords`, or `None` if `coords` is outside of the grid.
    pub fn get(&self, coords: GridCoords) -> Option<SubMeshId> {
        self.cell_index(coords).and_then(|i| self.cells[i])
    }

    pub fn row_version(&self, row: usize) -> Option<u64> {
        self.row_versions.get(row).copied()
    }

    /// Replaces the 16 cells of `section`. Only the 4 rows spanned by the section are touched.
    pub fn replace_section(&mut self, section: SectionIndex, meshes: &SectionMeshes) {
        if !self.layout.contains_section(section) {
            log::warn!("Ignoring replacement of section {} outside of the grid", section);
            return;
        }
        self.write_section(section, meshes);

        let first_row = (section / self.layout.sections_x) * SECTION_EDGE_MESHES;
        for version in self.row_versions[first_row..first_row + SECTION_EDGE_MESHES].iter_mut() {
            *version += 1;
        }
    }

    /// The ids currently placed in the cells of `section`, in local mesh order.
    pub fn section_slice(&self, section: SectionIndex) -> Option<[Option<SubMeshId>; MESHES_PER_SECTION]> {
        if !self.layout.contains_section(section) {
            return None;
        }
        Some(std::array::from_fn(|local| {
            self.get(cell_of(self.layout, SubMeshKey::new(section, local as u8)))
        }))
    }

    /// All occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoords, SubMeshId)> + '_ {
        let columns = self.columns();
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, id)| id.map(|id| (GridCoords::new(i / columns, i % columns), id)))
    }

    fn write_section(&mut self, section: SectionIndex, meshes: &SectionMeshes) {
        for (local, &id) in meshes.iter().enumerate() {
            let coords = cell_of(self.layout, SubMeshKey::new(section, local as u8));
            if let Some(i) = self.cell_index(coords) {
                self.cells[i] = Some(id);
            }
        }
    }

    fn cell_index(&self, coords: GridCoords) -> Option<usize> {
        (coords.row < self.rows() && coords.column < self.columns()).then(|| coords.row * self.columns() + coords.column)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    const OVERWORLD: GridLayout = GridLayout::new(9, 7);

    fn id(n: usize) -> SubMeshId {
        SubMeshId::new(n as u32 + 1).unwrap()
    }

    fn section_ids(section: usize, salt: usize) -> SectionMeshes {
        std::array::from_fn(|local| id(salt + section * 16 + local))
    }

    fn overworld_grid() -> MeshGrid {
        let sections: Vec<_> = (0..OVERWORLD.num_sections()).map(|s| section_ids(s, 0)).collect();
        MeshGrid::build(OVERWORLD, &sections)
    }

    #[test]
    fn build_places_sections_row_major() {
        let grid = overworld_grid();
        assert_eq!(grid.rows(), 28);
        assert_eq!(grid.columns(), 36);
        assert_eq!(grid.iter().count(), 63 * 16);

        // Local mesh 6 is local row 1, local column 2.
        assert_eq!(grid.get(GridCoords::new(17, 22)), Some(id(41 * 16 + 6)));
        assert_eq!(grid.get(GridCoords::new(0, 0)), Some(id(0)));
        assert_eq!(grid.get(GridCoords::new(28, 0)), None);
    }

    #[test]
    fn replace_touches_only_the_section() {
        let mut grid = overworld_grid();
        let before = grid.clone();
        let replacement = section_ids(41, 10_000);

        grid.replace_section(41, &replacement);

        assert_eq!(grid.section_slice(41), Some(replacement.map(Some)));
        for (coords, id) in before.iter() {
            let inside = (16..20).contains(&coords.row) && (20..24).contains(&coords.column);
            assert_eq!(grid.get(coords) != Some(id), inside, "{:?}", coords);
        }
    }

    #[test]
    fn replace_bumps_only_affected_rows() {
        let mut grid = overworld_grid();
        grid.replace_section(41, &section_ids(41, 10_000));
        grid.replace_section(42, &section_ids(42, 10_000));

        for row in 0..grid.rows() {
            let expected = if (16..20).contains(&row) { 2 } else { 0 };
            assert_eq!(grid.row_version(row), Some(expected), "row {}", row);
        }
        assert_eq!(grid.row_version(28), None);
    }
}
