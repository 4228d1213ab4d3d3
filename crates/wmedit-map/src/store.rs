mod map_file;

pub use map_file::*;

use crate::{
    section::{SectionIndex, SourceIndex},
    sub_mesh::{StoredSubMesh, SubMesh},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("LZ4 error: {0}")]
    Compression(#[from] lz4_flex::frame::Error),
    #[error("malformed map data: {0}")]
    Malformed(String),
    #[error("no section data at source index {source_index}")]
    MissingSource { source_index: SourceIndex },
}

/// # Mesh Store
///
/// The binary backing store of a map. Section variants are read from numbered *source* slots: base section `s` lives at
/// source `s`, while alternates live past the base sections (see [`source_index`](crate::source_index)).
///
/// Reads only need `&self` so that several sections can be loaded in parallel.
pub trait MeshStore: Sync {
    fn num_sources(&self) -> usize;

    /// Reads all 16 sub-meshes of `section` from slot `source`, in local mesh order.
    fn read_section(&self, section: SectionIndex, source: SourceIndex) -> Result<Vec<StoredSubMesh>, StoreError>;

    /// Replaces the stored records of `sub_mesh` in its own `(source, local mesh)` slot.
    fn write_sub_mesh(&mut self, sub_mesh: &SubMesh) -> Result<(), StoreError>;

    /// The main output stream.
    fn serialize_geometry(&self) -> Result<Vec<u8>, StoreError>;

    /// The sibling output stream that describes the layout of the geometry stream.
    fn serialize_auxiliary(&self) -> Result<Vec<u8>, StoreError>;
}
