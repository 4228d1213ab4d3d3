use crate::{
    coordinates::GridCoords,
    grid::MeshGrid,
    sub_mesh::SubMesh,
    variant_cache::SubMeshId,
};

use wmedit_core::arena::Arena32;

/// Position of a triangle in the current [`TriangleIndex`], as reported by hit-testing.
pub type FaceIndex = usize;

/// Addresses one triangle of one sub-mesh.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriangleRef {
    pub mesh: SubMeshId,
    pub triangle: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FaceEntry {
    pub mesh: SubMeshId,
    pub triangle: u32,
    pub coords: GridCoords,
}

impl FaceEntry {
    pub fn triangle_ref(&self) -> TriangleRef {
        TriangleRef {
            mesh: self.mesh,
            triangle: self.triangle,
        }
    }
}

/// A flat listing of every triangle placed in a [`MeshGrid`], in row-major cell order and triangle order within each cell.
///
/// Face indices are only meaningful for the generation they were taken from.
#[derive(Clone, Debug, Default)]
pub struct TriangleIndex {
    generation: u64,
    faces: Vec<FaceEntry>,
}

impl TriangleIndex {
    pub fn build(grid: &MeshGrid, meshes: &Arena32<SubMesh>, generation: u64) -> Self {
        let mut faces = Vec::new();
        for (coords, mesh) in grid.iter() {
            let Some(sub_mesh) = meshes.get(mesh) else {
                log::warn!("Grid cell {:?} refers to a missing sub-mesh", coords);
                continue;
            };
            faces.extend((0..sub_mesh.len() as u32).map(|triangle| FaceEntry {
                mesh,
                triangle,
                coords,
            }));
        }
        log::debug!("Indexed {} faces (generation {})", faces.len(), generation);

        Self { generation, faces }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resolve(&self, face: FaceIndex) -> Option<TriangleRef> {
        self.faces.get(face).map(FaceEntry::triangle_ref)
    }

    pub fn entry(&self, face: FaceIndex) -> Option<&FaceEntry> {
        self.faces.get(face)
    }

    pub fn entries(&self) -> &[FaceEntry] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
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
    use crate::test_util::record_for;
    use crate::{GridLayout, SectionMeshes, SubMeshKey};

    #[test]
    fn faces_follow_row_major_cells() {
        let layout = GridLayout::new(2, 2);
        let mut meshes = Arena32::default();
        let sections: Vec<SectionMeshes> = (0..4)
            .map(|section| {
                std::array::from_fn(|local| {
                    let key = SubMeshKey::new(section, local as u8);
                    let records = (0..3).map(|i| record_for(section, local, i)).collect();
                    meshes.insert(SubMesh::new(layout, key, section, records))
                })
            })
            .collect();
        let grid = MeshGrid::build(layout, &sections);

        let index = TriangleIndex::build(&grid, &meshes, 7);

        assert_eq!(index.generation(), 7);
        assert_eq!(index.len(), 64 * 3);
        // Row 0 spans sections 0 and 1, so face 12 is the first triangle of section 1, local mesh 0.
        let entry = index.entry(12).unwrap();
        assert_eq!(entry.coords, GridCoords::new(0, 4));
        assert_eq!(meshes[entry.mesh].key(), SubMeshKey::new(1, 0));
        assert_eq!(index.resolve(13).unwrap().triangle, 1);
        assert_eq!(index.resolve(64 * 3), None);
    }
}
