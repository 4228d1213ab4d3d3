use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use wmedit_map::{MapFile, MapType, MeshStore, TriangleRecord, MESHES_PER_SECTION};

/// A fresh directory under the system temp dir, removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(name: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "wmedit-{}-{}-{}",
            name,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn record(source: usize, local: usize, i: u32) -> TriangleRecord {
    TriangleRecord {
        texture: (source * MESHES_PER_SECTION + local) as u32 * 10 + i,
        uvs: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        vertices: [[0.0, 0.0, 0.0], [64.0, 0.0, 0.0], [0.0, 8.0, 64.0]],
        normals: [[0.0, 1.0, 0.0]; 3],
        ..Default::default()
    }
}

/// Two triangles per sub-mesh, and the 6 alternates for the overworld.
pub fn map_file_for(map_type: MapType) -> MapFile {
    let mut num_sources = map_type.config().layout.num_sections();
    if map_type == MapType::Overworld {
        num_sources += wmedit_map::ALTERNATIVE_SECTION_ORDER.len();
    }
    let sources: Vec<Vec<Vec<TriangleRecord>>> = (0..num_sources)
        .map(|source| {
            (0..MESHES_PER_SECTION)
                .map(|local| (0..2).map(|i| record(source, local, i)).collect())
                .collect()
        })
        .collect();
    MapFile::from_sources(sources).unwrap()
}

/// Writes a synthetic map of `map_type` into `data_root`.
pub fn write_map(data_root: &Path, map_type: MapType) {
    let store = map_file_for(map_type);
    crate::MapPaths::new(data_root, &map_type.config())
        .write(
            &store.serialize_geometry().unwrap(),
            &store.serialize_auxiliary().unwrap(),
        )
        .unwrap();
}
