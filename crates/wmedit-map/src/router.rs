use crate::{
    coordinates::GridCoords,
    grid::MeshGrid,
    sub_mesh::SubMesh,
    triangle::{Triangle, TriangleUpdate},
    triangle_index::{FaceIndex, TriangleIndex, TriangleRef},
};

use itertools::Itertools;
use wmedit_core::arena::Arena32;
use wmedit_core::glam::Vec3;

/// Callbacks into the rendering layer. Registered once per document and invoked synchronously.
pub trait RenderHooks {
    /// The whole map needs new colors, e.g. after an alternative group swap.
    fn recolor_all(&mut self) {}

    /// The texture id or UVs of `triangle` changed.
    fn retexture_triangle(&mut self, _triangle: &Triangle) {}

    /// Some normals of `triangle` changed. `normals` holds only the ones that were written.
    fn renormal_triangle(&mut self, _triangle: &Triangle, _normals: [Option<Vec3>; 3]) {}

    /// Moves the vertices of `triangle` and recomputes whatever depends on them.
    fn reposition_triangle(&mut self, triangle: &mut Triangle, vertices: [Vec3; 3]) {
        triangle.set_vertices(vertices);
    }
}

/// Hooks that only do the required bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl RenderHooks for NoopHooks {}

/// # Triangle Mutation Router
///
/// Applies attribute and position edits to triangles, keeping each triangle's logical record and its linked store record
/// identical, and notifies the [`RenderHooks`].
///
/// A [`TriangleRef`] only resolves while its sub-mesh is placed in the grid. References to a sub-mesh that was swapped out by
/// an alternative group change are stale and resolve to `None`.
pub struct TriangleRouter<'a> {
    meshes: &'a mut Arena32<SubMesh>,
    grid: &'a MeshGrid,
    hooks: &'a mut dyn RenderHooks,
}

impl<'a> TriangleRouter<'a> {
    pub fn new(meshes: &'a mut Arena32<SubMesh>, grid: &'a MeshGrid, hooks: &'a mut dyn RenderHooks) -> Self {
        Self { meshes, grid, hooks }
    }

    /// Merges `update` into the triangle. Returns the grid cell of the owning sub-mesh.
    pub fn update_triangle(&mut self, tref: TriangleRef, update: &TriangleUpdate) -> Option<GridCoords> {
        let Self { meshes, grid, hooks } = self;
        let triangle = resolve_in(meshes, grid, tref)?;
        let effects = triangle.apply(update);
        let coords = triangle.grid_coords();

        if effects.retextured {
            hooks.retexture_triangle(triangle);
        }
        if effects.renormaled {
            hooks.renormal_triangle(triangle, update.normals);
        }

        Some(coords)
    }

    /// Applies the same update to every face. Returns the touched grid cells, without duplicates, in first-touched order.
    pub fn update_many(&mut self, faces: &[FaceIndex], index: &TriangleIndex, update: &TriangleUpdate) -> Vec<GridCoords> {
        faces
            .iter()
            .filter_map(|&face| {
                let tref = index.resolve(face);
                if tref.is_none() {
                    log::debug!("Face {} is not in the triangle index", face);
                }
                tref
            })
            .filter_map(|tref| self.update_triangle(tref, update))
            .unique()
            .collect()
    }

    /// Position-only edit. The hook recomputes the triangle, then the whole record is copied to the linked record.
    pub fn update_vertices(&mut self, tref: TriangleRef, vertices: [Vec3; 3]) -> Option<GridCoords> {
        let Self { meshes, grid, hooks } = self;
        let triangle = resolve_in(meshes, grid, tref)?;
        hooks.reposition_triangle(triangle, vertices);
        triangle.sync_link();
        Some(triangle.grid_coords())
    }
}

fn resolve_in<'m>(meshes: &'m mut Arena32<SubMesh>, grid: &MeshGrid, tref: TriangleRef) -> Option<&'m mut Triangle> {
    let sub_mesh = meshes.get_mut(tref.mesh)?;
    if grid.get(sub_mesh.coords(grid.layout())) != Some(tref.mesh) {
        log::debug!("Stale reference to sub-mesh {:?}", sub_mesh.key());
        return None;
    }
    sub_mesh.triangle_mut(tref.triangle)
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
    use crate::test_util::{store_for, TRIANGLES_PER_MESH};
    use crate::{MapType, SectionMeshes, SectionVariantCache, Variant};
    use bytemuck::bytes_of;
    use wmedit_core::glam::Vec2;

    #[derive(Default)]
    struct RecordingHooks {
        retextured: Vec<u32>,
        renormaled: Vec<[Option<Vec3>; 3]>,
        repositioned: usize,
    }

    impl RenderHooks for RecordingHooks {
        fn retexture_triangle(&mut self, triangle: &Triangle) {
            self.retextured.push(triangle.texture());
        }

        fn renormal_triangle(&mut self, _triangle: &Triangle, normals: [Option<Vec3>; 3]) {
            self.renormaled.push(normals);
        }

        fn reposition_triangle(&mut self, triangle: &mut Triangle, vertices: [Vec3; 3]) {
            self.repositioned += 1;
            triangle.set_vertices(vertices.map(|v| v * 2.0));
        }
    }

    struct Fixture {
        // Keeps the linked blocks alive.
        store: crate::MapFile,
        meshes: Arena32<SubMesh>,
        grid: MeshGrid,
        index: TriangleIndex,
    }

    fn glacier() -> Fixture {
        let config = MapType::Glacier.config();
        let store = store_for(MapType::Glacier);
        let mut meshes = Arena32::default();
        let mut cache = SectionVariantCache::new(config);
        let requests: Vec<_> = (0..config.layout.num_sections()).map(|s| (s, Variant::Base)).collect();
        let sections: Vec<SectionMeshes> = cache.load_variant_list(&mut meshes, &store, &requests).unwrap();
        let grid = MeshGrid::build(config.layout, &sections);
        let index = TriangleIndex::build(&grid, &meshes, 0);
        Fixture {
            store,
            meshes,
            grid,
            index,
        }
    }

    #[test]
    fn update_mirrors_into_the_store() {
        let mut f = glacier();
        let mut hooks = RecordingHooks::default();
        let tref = f.index.resolve(5).unwrap();

        let mut update = TriangleUpdate {
            texture: Some(1234),
            terrain: Some(7),
            ..Default::default()
        };
        update.uvs[1] = Some(Vec2::new(0.25, 0.5));
        let coords = TriangleRouter::new(&mut f.meshes, &f.grid, &mut hooks).update_triangle(tref, &update);

        assert_eq!(coords, Some(f.index.entry(5).unwrap().coords));
        assert_eq!(hooks.retextured, vec![1234]);
        assert!(hooks.renormaled.is_empty());

        let triangle = f.meshes[tref.mesh].triangle(tref.triangle).unwrap();
        let linked = triangle.linked_record().unwrap();
        assert_eq!(bytes_of(&linked), bytes_of(triangle.record()));
        assert_eq!(linked.texture, 1234);
    }

    #[test]
    fn normal_updates_forward_only_written_normals() {
        let mut f = glacier();
        let mut hooks = RecordingHooks::default();
        let tref = f.index.resolve(0).unwrap();

        let mut update = TriangleUpdate::default();
        update.normals[1] = Some(Vec3::Z);
        TriangleRouter::new(&mut f.meshes, &f.grid, &mut hooks).update_triangle(tref, &update);

        assert_eq!(hooks.renormaled, vec![[None, Some(Vec3::Z), None]]);
        assert!(hooks.retextured.is_empty());
    }

    #[test]
    fn update_many_deduplicates_cells_in_touch_order() {
        let mut f = glacier();
        let per_mesh = TRIANGLES_PER_MESH as usize;
        // Faces of cell 1, cell 0, cell 1 again, and one face past the end.
        let faces = [per_mesh, 0, per_mesh + 1, f.index.len()];
        let update = TriangleUpdate {
            region: Some(3),
            ..Default::default()
        };

        let cells = TriangleRouter::new(&mut f.meshes, &f.grid, &mut NoopHooks).update_many(&faces, &f.index, &update);

        assert_eq!(cells, vec![GridCoords::new(0, 1), GridCoords::new(0, 0)]);
        for &face in &faces[..3] {
            let tref = f.index.resolve(face).unwrap();
            let triangle = f.meshes[tref.mesh].triangle(tref.triangle).unwrap();
            let linked = triangle.linked_record().unwrap();
            assert_eq!(bytes_of(&linked), bytes_of(triangle.record()));
            assert_eq!(linked.region, 3);
        }
    }

    #[test]
    fn unchanged_values_raise_no_hooks() {
        let mut f = glacier();
        let mut hooks = RecordingHooks::default();
        let tref = f.index.resolve(2).unwrap();
        let triangle = f.meshes[tref.mesh].triangle(tref.triangle).unwrap();

        let mut update = TriangleUpdate {
            texture: Some(triangle.texture()),
            terrain: Some(31),
            ..Default::default()
        };
        update.normals[0] = Some(triangle.normal(0));
        let coords = TriangleRouter::new(&mut f.meshes, &f.grid, &mut hooks).update_triangle(tref, &update);

        // Still an edit of the owning sub-mesh.
        assert!(coords.is_some());
        assert!(hooks.retextured.is_empty());
        assert!(hooks.renormaled.is_empty());
    }

    #[test]
    fn vertex_updates_go_through_the_hook() {
        let mut f = glacier();
        let mut hooks = RecordingHooks::default();
        let tref = f.index.resolve(3).unwrap();
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Z];

        let coords = TriangleRouter::new(&mut f.meshes, &f.grid, &mut hooks).update_vertices(tref, vertices);

        assert!(coords.is_some());
        assert_eq!(hooks.repositioned, 1);
        let triangle = f.meshes[tref.mesh].triangle(tref.triangle).unwrap();
        assert_eq!(triangle.vertex(1), Vec3::X * 2.0);
        assert_eq!(triangle.linked_record().unwrap(), *triangle.record());
    }

    #[test]
    fn unresolvable_references_return_none() {
        let mut f = glacier();
        let tref = f.index.resolve(0).unwrap();
        let update = TriangleUpdate {
            script: Some(1),
            ..Default::default()
        };
        let mut hooks = NoopHooks;
        let mut router = TriangleRouter::new(&mut f.meshes, &f.grid, &mut hooks);

        let out_of_range = TriangleRef {
            triangle: TRIANGLES_PER_MESH,
            ..tref
        };
        assert_eq!(router.update_triangle(out_of_range, &update), None);
        assert_eq!(router.update_vertices(out_of_range, [Vec3::ZERO; 3]), None);
    }

    #[test]
    fn swapped_out_meshes_are_stale() {
        let mut f = glacier();
        let tref = f.index.resolve(0).unwrap();

        // Replace section 0 with freshly materialized copies of itself.
        let mut fresh_cache = SectionVariantCache::new(MapType::Glacier.config());
        let fresh = fresh_cache.get_variant(&mut f.meshes, &f.store, 0, Variant::Base).unwrap();
        f.grid.replace_section(0, &fresh);

        let update = TriangleUpdate {
            script: Some(1),
            ..Default::default()
        };
        let mut hooks = NoopHooks;
        let mut router = TriangleRouter::new(&mut f.meshes, &f.grid, &mut hooks);
        assert_eq!(router.update_triangle(tref, &update), None);
    }
}
