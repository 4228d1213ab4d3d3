use crate::{
    change_set::ChangeSet,
    config::{MapConfig, MapType},
    coordinates::{local_to_global, GridCoords},
    grid::MeshGrid,
    groups::{resolve_groups, GroupSet},
    router::{NoopHooks, RenderHooks, TriangleRouter},
    section::{GroupId, SectionIndex, Variant},
    selection::{SelectionSet, TextureSnapshot},
    store::{MeshStore, StoreError},
    sub_mesh::SubMesh,
    triangle::{Triangle, TriangleUpdate},
    triangle_index::{FaceIndex, TriangleIndex, TriangleRef},
    units::{GlobalUnits, LocalUnits},
    variant_cache::SectionVariantCache,
};

use itertools::Itertools;
use wmedit_core::arena::Arena32;
use wmedit_core::glam::Vec3;

/// # Map Document
///
/// Everything that is known about one loaded map: its sub-meshes, the assembled grid, the active alternative sections, unsaved
/// changes and the current selection.
///
/// ## Implementation
///
/// Sub-meshes live in an [`Arena32`] and are never removed while the document exists. The grid, cache, change set and
/// triangle index only hold ids into that arena. A swapped-out variant therefore keeps its triangles (and any edits made to
/// them) for when it is swapped back in.
pub struct MapDocument {
    config: MapConfig,
    meshes: Arena32<SubMesh>,
    cache: SectionVariantCache,
    grid: MeshGrid,
    index: TriangleIndex,
    active_sections: Vec<SectionIndex>,
    active_groups: GroupSet,
    changes: ChangeSet,
    selection: SelectionSet,
    hooks: Box<dyn RenderHooks + Send>,
    unsaved: bool,
}

impl MapDocument {
    /// Reads every base section from `store` and assembles the grid. Nothing is returned unless every section loaded.
    pub fn load(map_type: MapType, store: &impl MeshStore) -> Result<Self, StoreError> {
        let config = map_type.config();
        let mut meshes = Arena32::default();
        let mut cache = SectionVariantCache::new(config);

        let requests: Vec<_> = (0..config.layout.num_sections())
            .map(|section| (section, Variant::Base))
            .collect();
        let sections = cache.load_variant_list(&mut meshes, store, &requests)?;
        let grid = MeshGrid::build(config.layout, &sections);
        let index = TriangleIndex::build(&grid, &meshes, 0);

        log::info!(
            "Loaded {} map: {} sub-meshes, {} faces",
            map_type,
            meshes.len(),
            index.len()
        );

        Ok(Self {
            config,
            meshes,
            cache,
            grid,
            index,
            active_sections: Vec::new(),
            active_groups: GroupSet::new(),
            changes: ChangeSet::default(),
            selection: SelectionSet::default(),
            hooks: Box::new(NoopHooks),
            unsaved: false,
        })
    }

    /// Replaces all state with a fresh load from `store` and hands the store back, since the new triangles link into it.
    /// Registered hooks are kept. On failure the document is unchanged.
    ///
    /// Edits are mirrored into the store a document was loaded from, so reloading from that same store would keep them.
    /// Taking `store` by value makes the caller supply a newly read one.
    pub fn reload<S: MeshStore>(&mut self, store: S) -> Result<S, StoreError> {
        let mut fresh = Self::load(self.config.map_type, &store)?;
        fresh.index = TriangleIndex::build(&fresh.grid, &fresh.meshes, self.index.generation() + 1);
        fresh.hooks = std::mem::replace(&mut self.hooks, Box::new(NoopHooks));
        *self = fresh;
        Ok(store)
    }

    pub fn register_hooks(&mut self, hooks: Box<dyn RenderHooks + Send>) {
        self.hooks = hooks;
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn map_type(&self) -> MapType {
        self.config.map_type
    }

    pub fn grid(&self) -> &MeshGrid {
        &self.grid
    }

    pub fn meshes(&self) -> &Arena32<SubMesh> {
        &self.meshes
    }

    pub fn variant_cache(&self) -> &SectionVariantCache {
        &self.cache
    }

    pub fn triangle_index(&self) -> &TriangleIndex {
        &self.index
    }

    pub fn active_sections(&self) -> &[SectionIndex] {
        &self.active_sections
    }

    pub fn active_groups(&self) -> &[GroupId] {
        &self.active_groups
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// `true` if there is anything that a save would persist.
    pub fn needs_saving(&self) -> bool {
        self.unsaved || !self.changes.is_empty()
    }

    pub fn triangle(&self, tref: TriangleRef) -> Option<&Triangle> {
        self.meshes.get(tref.mesh)?.triangle(tref.triangle)
    }

    pub fn resolve_face(&self, face: FaceIndex) -> Option<TriangleRef> {
        self.index.resolve(face)
    }

    pub fn face_triangle(&self, face: FaceIndex) -> Option<&Triangle> {
        self.triangle(self.index.resolve(face)?)
    }

    /// The vertices of `face` in world space.
    pub fn face_world_vertices(&self, face: FaceIndex, scale: f32) -> Option<[GlobalUnits<Vec3>; 3]> {
        let triangle = self.face_triangle(face)?;
        let coords = triangle.grid_coords();
        Some(
            triangle
                .vertices()
                .map(|v| local_to_global(LocalUnits(v), coords, scale)),
        )
    }

    /// Enables the alternative groups of the `requested` sections and disables all others.
    ///
    /// Returns `true` if the grid changed. Every needed variant is loaded before the grid is touched, so on error the document is
    /// unchanged. A swap by itself does not mark any sub-mesh as dirty.
    pub fn set_active_alternatives(
        &mut self,
        store: &impl MeshStore,
        requested: &[SectionIndex],
    ) -> Result<bool, StoreError> {
        if !self.config.supports_alternatives() {
            log::debug!("{} map has no alternative sections", self.config.map_type);
            return Ok(false);
        }

        let Some(transition) = resolve_groups(&self.active_sections, &self.active_groups, requested) else {
            return Ok(false);
        };
        if transition.is_bookkeeping_only() {
            self.active_sections = transition.sections;
            return Ok(false);
        }

        let replacements: Vec<_> = transition.replacements().collect();
        let loaded = self.cache.load_variant_list(&mut self.meshes, store, &replacements)?;
        for (&(section, _), meshes) in replacements.iter().zip(loaded.iter()) {
            self.grid.replace_section(section, meshes);
        }

        log::info!(
            "Alternative groups {:?} -> {:?} (enabled {:?}, disabled {:?})",
            self.active_groups,
            transition.groups,
            transition.enable,
            transition.disable
        );
        self.active_sections = transition.sections;
        self.active_groups = transition.groups;
        self.rebuild_index();
        self.unsaved = true;
        self.hooks.recolor_all();

        Ok(true)
    }

    pub fn update_triangle(&mut self, tref: TriangleRef, update: &TriangleUpdate) -> Option<GridCoords> {
        let coords =
            TriangleRouter::new(&mut self.meshes, &self.grid, self.hooks.as_mut()).update_triangle(tref, update)?;
        self.mark_dirty(coords);
        Some(coords)
    }

    pub fn update_face(&mut self, face: FaceIndex, update: &TriangleUpdate) -> Option<GridCoords> {
        self.update_triangle(self.index.resolve(face)?, update)
    }

    pub fn update_many(&mut self, faces: &[FaceIndex], update: &TriangleUpdate) -> Vec<GridCoords> {
        let cells = TriangleRouter::new(&mut self.meshes, &self.grid, self.hooks.as_mut())
            .update_many(faces, &self.index, update);
        for &coords in cells.iter() {
            self.mark_dirty(coords);
        }
        cells
    }

    pub fn update_vertices(&mut self, tref: TriangleRef, vertices: [Vec3; 3]) -> Option<GridCoords> {
        let coords =
            TriangleRouter::new(&mut self.meshes, &self.grid, self.hooks.as_mut()).update_vertices(tref, vertices)?;
        self.mark_dirty(coords);
        Some(coords)
    }

    /// Applies `update` to every selected face.
    pub fn paint_selection(&mut self, update: &TriangleUpdate) -> Vec<GridCoords> {
        let faces: Vec<_> = self.selection.iter().collect();
        self.update_many(&faces, update)
    }

    pub fn select(&mut self, face: FaceIndex, selected: bool) {
        self.selection.toggle(face, selected);
    }

    pub fn select_many(&mut self, faces: impl IntoIterator<Item = FaceIndex>) {
        self.selection.add_many(faces);
    }

    pub fn deselect_many(&mut self, faces: impl IntoIterator<Item = FaceIndex>) {
        self.selection.remove_many(faces);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn copy_selection(&self) -> Vec<TextureSnapshot> {
        self.selection.copy(|face| self.face_triangle(face))
    }

    /// Pastes `snapshots` cyclically over the selection, then clears it.
    pub fn paste_selection(&mut self, snapshots: &[TextureSnapshot]) -> Vec<GridCoords> {
        let plan = self.selection.paste_plan(snapshots);
        let cells: Vec<_> = plan
            .iter()
            .filter_map(|(face, update)| self.update_face(*face, update))
            .unique()
            .collect();
        self.selection.clear();
        cells
    }

    /// Writes every pending sub-mesh to `store` and hands the serialized geometry and auxiliary streams to `commit`.
    ///
    /// Pending changes are only cleared once `commit` succeeds. Returns the number of sub-meshes written.
    pub fn save<E>(
        &mut self,
        store: &mut impl MeshStore,
        commit: impl FnOnce(Vec<u8>, Vec<u8>) -> Result<(), E>,
    ) -> Result<usize, E>
    where
        E: From<StoreError>,
    {
        for dirty in self.changes.pending() {
            let sub_mesh = self.meshes.get(dirty.mesh).ok_or_else(|| {
                StoreError::Malformed(format!("pending sub-mesh {:?} is not in the arena", dirty.key))
            })?;
            store.write_sub_mesh(sub_mesh)?;
        }
        let geometry = store.serialize_geometry()?;
        let auxiliary = store.serialize_auxiliary()?;
        commit(geometry, auxiliary)?;

        let written = self.changes.len();
        log::info!("Saved {} map ({} sub-meshes)", self.config.map_type, written);
        self.changes.clear();
        self.unsaved = false;

        Ok(written)
    }

    fn mark_dirty(&mut self, coords: GridCoords) {
        let Some((mesh, key)) = self
            .grid
            .get(coords)
            .and_then(|mesh| self.meshes.get(mesh).map(|m| (mesh, m.key())))
        else {
            return;
        };
        if self.changes.mark_dirty(key, mesh) {
            log::trace!("Marked {:?} dirty", key);
        }
        self.unsaved = true;
    }

    fn rebuild_index(&mut self) {
        self.index = TriangleIndex::build(&self.grid, &self.meshes, self.index.generation() + 1);
        self.selection.clear();
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
