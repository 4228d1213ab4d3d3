//! Synthetic stores for tests.

use crate::{
    section::{SectionIndex, SourceIndex, MESHES_PER_SECTION},
    store::{MapFile, MeshStore, StoreError},
    sub_mesh::{StoredSubMesh, SubMesh},
    triangle::TriangleRecord,
    MapType, BASE_SECTION_COUNT, ALTERNATIVE_SECTION_ORDER,
};

use std::sync::atomic::{AtomicUsize, Ordering};

pub const TRIANGLES_PER_MESH: u32 = 2;

/// A recognizable record: the texture encodes where the record was generated.
pub fn record_for(source: SourceIndex, local: usize, i: u32) -> TriangleRecord {
    let base = (source * MESHES_PER_SECTION + local) as u32;
    TriangleRecord {
        terrain: base % 32,
        region: source as u32,
        script: 0,
        chocobo: 0,
        texture: base * 10 + i,
        uvs: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        vertices: [
            [0.0, 0.0, 0.0],
            [100.0 + i as f32, 0.0, 0.0],
            [0.0, 0.0, 100.0 + i as f32],
        ],
        normals: [[0.0, 1.0, 0.0]; 3],
    }
}

pub fn store_with_sources(num_sources: usize) -> MapFile {
    let sources: Vec<Vec<Vec<TriangleRecord>>> = (0..num_sources)
        .map(|source| {
            (0..MESHES_PER_SECTION)
                .map(|local| (0..TRIANGLES_PER_MESH).map(|i| record_for(source, local, i)).collect())
                .collect()
        })
        .collect();
    MapFile::from_sources(sources).unwrap()
}

/// 63 base sections plus 6 alternates.
pub fn overworld_store() -> MapFile {
    store_with_sources(BASE_SECTION_COUNT + ALTERNATIVE_SECTION_ORDER.len())
}

pub fn store_for(map_type: MapType) -> MapFile {
    match map_type {
        MapType::Overworld => overworld_store(),
        other => store_with_sources(other.config().layout.num_sections()),
    }
}

/// Counts section reads and can be told to fail them.
pub struct CountingStore {
    pub inner: MapFile,
    reads: AtomicUsize,
    pub fail_sources: Vec<SourceIndex>,
}

impl CountingStore {
    pub fn new(inner: MapFile) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            fail_sources: Vec::new(),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl MeshStore for CountingStore {
    fn num_sources(&self) -> usize {
        self.inner.num_sources()
    }

    fn read_section(&self, section: SectionIndex, source: SourceIndex) -> Result<Vec<StoredSubMesh>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_sources.contains(&source) {
            return Err(StoreError::Malformed(format!("test failure at {}", source)));
        }
        self.inner.read_section(section, source)
    }

    fn write_sub_mesh(&mut self, sub_mesh: &SubMesh) -> Result<(), StoreError> {
        self.inner.write_sub_mesh(sub_mesh)
    }

    fn serialize_geometry(&self) -> Result<Vec<u8>, StoreError> {
        self.inner.serialize_geometry()
    }

    fn serialize_auxiliary(&self) -> Result<Vec<u8>, StoreError> {
        self.inner.serialize_auxiliary()
    }
}
