use crate::{EditorConfig, EditorError, MapPaths};

use wmedit_map::{
    core::SmallKeyHashMap,
    glam::Vec3,
    FaceIndex, GlobalUnits, GridCoords, MapDocument, MapFile, MapType, RenderHooks, SectionIndex, TextureSnapshot,
    TriangleRef, TriangleUpdate,
};

/// Loads the textures of a map. Runs concurrently with the mesh load.
pub trait TextureSource: Sync {
    fn load_textures(&self, map_type: MapType) -> Result<(), EditorError>;
}

/// For tools that never render.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextures;

impl TextureSource for NoTextures {
    fn load_textures(&self, _map_type: MapType) -> Result<(), EditorError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EditMode {
    #[default]
    Inspect,
    Paint,
}

/// What a hit-test on a face did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pick {
    /// Paint mode: the face's new selection state.
    Selected(bool),
    /// Inspect mode: the triangle under the cursor.
    Inspected(TriangleRef),
}

/// A document together with the store it was read from. Triangles of the document link into the store.
pub struct LoadedMap {
    pub document: MapDocument,
    pub store: MapFile,
}

/// # Editor
///
/// Owns every loaded map and routes requests to the active one. Requests that need a document are no-ops while no map is
/// active.
pub struct Editor {
    config: EditorConfig,
    maps: SmallKeyHashMap<MapType, LoadedMap>,
    active: Option<MapType>,
    mode: EditMode,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            maps: SmallKeyHashMap::default(),
            active: None,
            mode: EditMode::default(),
        }
    }

    pub fn from_config_file(path: &str) -> Result<Self, EditorError> {
        Ok(Self::new(EditorConfig::read_file(path)?))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn paths(&self, map_type: MapType) -> MapPaths {
        MapPaths::new(&self.config.data_root, &map_type.config())
    }

    /// Reads the files of `map_type` and its textures in parallel. The new document replaces any previous one only if both
    /// succeed.
    pub fn load(&mut self, map_type: MapType, textures: &dyn TextureSource) -> Result<(), EditorError> {
        let paths = self.paths(map_type);
        let (loaded, textures) = rayon::join(
            || -> Result<LoadedMap, EditorError> {
                let store = paths.read()?;
                let document = MapDocument::load(map_type, &store)?;
                Ok(LoadedMap { document, store })
            },
            || textures.load_textures(map_type),
        );
        let loaded = loaded?;
        textures?;

        if self.maps.insert(map_type, loaded).is_some() {
            log::info!("Replaced the loaded {} map", map_type);
        }
        Ok(())
    }

    /// Discards unsaved edits of a loaded map by reading its files again. Hooks stay registered; selection and pending
    /// changes are cleared. On failure the loaded map is unchanged.
    pub fn reload(&mut self, map_type: MapType) -> Result<(), EditorError> {
        let paths = self.paths(map_type);
        let loaded = self.maps.get_mut(&map_type).ok_or(EditorError::NotLoaded(map_type))?;
        let store = paths.read()?;
        loaded.store = loaded.document.reload(store)?;
        log::info!("Reloaded {} map from {:?}", map_type, paths.geometry);
        Ok(())
    }

    pub fn is_loaded(&self, map_type: MapType) -> bool {
        self.maps.contains_key(&map_type)
    }

    pub fn activate(&mut self, map_type: MapType) -> Result<(), EditorError> {
        if !self.is_loaded(map_type) {
            return Err(EditorError::NotLoaded(map_type));
        }
        log::debug!("Activating {} map", map_type);
        self.active = Some(map_type);
        Ok(())
    }

    pub fn active(&self) -> Option<MapType> {
        self.active
    }

    pub fn document(&self, map_type: MapType) -> Option<&MapDocument> {
        self.maps.get(&map_type).map(|m| &m.document)
    }

    pub fn active_document(&self) -> Option<&MapDocument> {
        self.document(self.active?)
    }

    pub fn register_hooks(&mut self, map_type: MapType, hooks: Box<dyn RenderHooks + Send>) -> Result<(), EditorError> {
        let loaded = self.maps.get_mut(&map_type).ok_or(EditorError::NotLoaded(map_type))?;
        loaded.document.register_hooks(hooks);
        Ok(())
    }

    pub fn edit_mode(&self) -> EditMode {
        self.mode
    }

    /// Leaving paint mode clears the selection.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        if self.mode == EditMode::Paint && mode != EditMode::Paint {
            if let Some(doc) = self.active_document_mut() {
                doc.clear_selection();
            }
        }
        self.mode = mode;
    }

    pub fn update_face(&mut self, face: FaceIndex, update: &TriangleUpdate) -> Option<GridCoords> {
        self.active_document_mut()?.update_face(face, update)
    }

    pub fn update_vertices(&mut self, face: FaceIndex, vertices: [Vec3; 3]) -> Option<GridCoords> {
        let doc = self.active_document_mut()?;
        let tref = doc.resolve_face(face)?;
        doc.update_vertices(tref, vertices)
    }

    pub fn paint_selection(&mut self, update: &TriangleUpdate) -> Vec<GridCoords> {
        match self.active_document_mut() {
            Some(doc) => doc.paint_selection(update),
            None => Vec::new(),
        }
    }

    /// Returns `true` if the grid changed.
    pub fn set_alternatives(&mut self, sections: &[SectionIndex]) -> Result<bool, EditorError> {
        let Some(LoadedMap { document, store }) = self.active_map_mut() else {
            return Ok(false);
        };
        Ok(document.set_active_alternatives(&*store, sections)?)
    }

    pub fn select(&mut self, face: FaceIndex, selected: bool) -> bool {
        self.with_document(|doc| doc.select(face, selected))
    }

    pub fn select_many(&mut self, faces: impl IntoIterator<Item = FaceIndex>) -> bool {
        self.with_document(|doc| doc.select_many(faces))
    }

    pub fn deselect_many(&mut self, faces: impl IntoIterator<Item = FaceIndex>) -> bool {
        self.with_document(|doc| doc.deselect_many(faces))
    }

    pub fn copy_selection(&self) -> Vec<TextureSnapshot> {
        self.active_document().map(MapDocument::copy_selection).unwrap_or_default()
    }

    pub fn paste(&mut self, snapshots: &[TextureSnapshot]) -> Vec<GridCoords> {
        match self.active_document_mut() {
            Some(doc) => doc.paste_selection(snapshots),
            None => Vec::new(),
        }
    }

    /// Handles a hit-test result according to the edit mode.
    pub fn pick(&mut self, face: FaceIndex) -> Option<Pick> {
        let mode = self.mode;
        let doc = self.active_document_mut()?;
        let tref = doc.resolve_face(face)?;
        Some(match mode {
            EditMode::Inspect => Pick::Inspected(tref),
            EditMode::Paint => {
                let selected = !doc.selection().contains(face);
                doc.select(face, selected);
                Pick::Selected(selected)
            }
        })
    }

    pub fn face_world_vertices(&self, face: FaceIndex) -> Option<[GlobalUnits<Vec3>; 3]> {
        self.active_document()?.face_world_vertices(face, self.config.world_scale)
    }

    /// Persists the active map. Returns the number of sub-meshes written, which is 0 when no map is active.
    pub fn save(&mut self) -> Result<usize, EditorError> {
        let Some(map_type) = self.active else {
            return Ok(0);
        };
        let paths = self.paths(map_type);
        let Some(LoadedMap { document, store }) = self.maps.get_mut(&map_type) else {
            return Ok(0);
        };
        document.save(store, |geometry, auxiliary| paths.write(&geometry, &auxiliary))
    }

    fn active_map_mut(&mut self) -> Option<&mut LoadedMap> {
        self.maps.get_mut(&self.active?)
    }

    fn active_document_mut(&mut self) -> Option<&mut MapDocument> {
        self.active_map_mut().map(|m| &mut m.document)
    }

    fn with_document(&mut self, f: impl FnOnce(&mut MapDocument)) -> bool {
        match self.active_document_mut() {
            Some(doc) => {
                f(doc);
                true
            }
            None => false,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
