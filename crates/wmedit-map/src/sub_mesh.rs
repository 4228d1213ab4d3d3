use crate::{
    coordinates::{cell_of, mesh_offset, GridCoords},
    config::GridLayout,
    section::{SourceIndex, SubMeshKey},
    store::StoreError,
    triangle::{RecordLink, Triangle, TriangleRecord},
};

use bytemuck::{cast_slice, cast_slice_mut, Zeroable};
use lz4_flex::frame::{FrameDecoder, FrameEncoder};
use parking_lot::RwLock;
use std::io::{self, Read};
use std::mem;
use std::sync::{Arc, Weak};

/// The triangle records of one sub-mesh as held by a backing store.
///
/// Compressed bytes are cached until the next mutable access.
#[derive(Clone, Debug, Default)]
pub struct RecordBlock {
    records: Vec<TriangleRecord>,
    compressed: Option<Box<[u8]>>,
}

impl RecordBlock {
    pub fn new(records: Vec<TriangleRecord>) -> Self {
        Self {
            records,
            compressed: None,
        }
    }

    pub fn records(&self) -> &[TriangleRecord] {
        &self.records
    }

    pub fn record_mut(&mut self, index: usize) -> Option<&mut TriangleRecord> {
        self.compressed = None;
        self.records.get_mut(index)
    }

    pub fn replace_records(&mut self, records: Vec<TriangleRecord>) {
        self.compressed = None;
        self.records = records;
    }

    /// LZ4 frame of the raw record bytes. Reuses the cached frame if nothing changed since the last call.
    pub fn compressed(&mut self) -> Result<&[u8], StoreError> {
        if self.compressed.is_none() {
            self.compressed = Some(compress_records(&self.records)?);
        }
        Ok(self.compressed.as_deref().unwrap_or_default())
    }

    /// Decodes a block of `num_records` records from an LZ4 frame.
    ///
    /// `num_records` comes from the file, so nothing is allocated for it up front. The frame is decoded with a cap of one
    /// byte past the expected size, and any length mismatch is reported as malformed.
    pub fn from_compressed_bytes(bytes: &[u8], num_records: usize) -> Result<Self, StoreError> {
        let expected = num_records
            .checked_mul(mem::size_of::<TriangleRecord>())
            .ok_or_else(|| StoreError::Malformed(format!("{} triangles overflow a sub-mesh block", num_records)))?;

        let mut raw = Vec::new();
        FrameDecoder::new(bytes)
            .take(expected as u64 + 1)
            .read_to_end(&mut raw)
            .map_err(|e| StoreError::Malformed(format!("bad sub-mesh block: {}", e)))?;
        if raw.len() != expected {
            return Err(StoreError::Malformed(format!(
                "sub-mesh block holds {} bytes, expected {} triangles",
                raw.len(),
                num_records
            )));
        }

        let mut records = vec![TriangleRecord::zeroed(); num_records];
        cast_slice_mut(&mut records).copy_from_slice(&raw);

        Ok(Self {
            records,
            compressed: Some(bytes.into()),
        })
    }
}

fn compress_records(records: &[TriangleRecord]) -> Result<Box<[u8]>, StoreError> {
    let mut encoder = FrameEncoder::new(Vec::with_capacity(records.len() * mem::size_of::<TriangleRecord>() / 2));
    let mut reader: &[u8] = cast_slice(records);
    io::copy(&mut reader, &mut encoder)?;
    Ok(encoder.finish()?.into_boxed_slice())
}

pub type RecordBlockHandle = Arc<RwLock<RecordBlock>>;

/// One sub-mesh as handed out by a [`MeshStore`](crate::MeshStore): a copy of its records and, if the store retains them, a
/// weak handle to the originals.
#[derive(Clone, Debug, Default)]
pub struct StoredSubMesh {
    pub records: Vec<TriangleRecord>,
    pub block: Option<Weak<RwLock<RecordBlock>>>,
}

/// The atomic unit of geometry, triangle storage, dirty tracking and persistence.
#[derive(Clone, Debug)]
pub struct SubMesh {
    key: SubMeshKey,
    source: SourceIndex,
    triangles: Vec<Triangle>,
}

impl SubMesh {
    /// An unlinked sub-mesh. Its triangles are placed at `key`'s cell in `layout`.
    pub fn new(layout: GridLayout, key: SubMeshKey, source: SourceIndex, records: Vec<TriangleRecord>) -> Self {
        Self::from_stored(
            layout,
            key,
            source,
            StoredSubMesh {
                records,
                block: None,
            },
        )
    }

    /// Materializes fresh triangles from store data, linking each one to its stored record when possible.
    pub fn from_stored(layout: GridLayout, key: SubMeshKey, source: SourceIndex, stored: StoredSubMesh) -> Self {
        let offset = mesh_offset(cell_of(layout, key));
        let StoredSubMesh { records, block } = stored;
        let triangles = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| match &block {
                Some(block) => Triangle::new_linked(record, offset, RecordLink::new(block.clone(), i as u32)),
                None => Triangle::new(record, offset),
            })
            .collect();

        Self {
            key,
            source,
            triangles,
        }
    }

    pub fn key(&self) -> SubMeshKey {
        self.key
    }

    pub fn source(&self) -> SourceIndex {
        self.source
    }

    pub fn coords(&self, layout: GridLayout) -> GridCoords {
        cell_of(layout, self.key)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle(&self, index: u32) -> Option<&Triangle> {
        self.triangles.get(index as usize)
    }

    pub fn triangle_mut(&mut self, index: u32) -> Option<&mut Triangle> {
        self.triangles.get_mut(index as usize)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Snapshot of the logical records, in triangle order. This is what gets written back to a store.
    pub fn records(&self) -> Vec<TriangleRecord> {
        self.triangles.iter().map(|t| *t.record()).collect()
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

    #[test]
    fn compress_and_decompress_block() {
        let records: Vec<_> = (0..40).map(|i| record_for(3, 7, i)).collect();
        let mut block = RecordBlock::new(records.clone());
        let bytes = block.compressed().unwrap().to_vec();
        assert!(bytes.len() < records.len() * mem::size_of::<TriangleRecord>());

        let decoded = RecordBlock::from_compressed_bytes(&bytes, records.len()).unwrap();
        assert_eq!(decoded.records(), &records[..]);
    }

    #[test]
    fn wrong_triangle_count_is_malformed() {
        let records: Vec<_> = (0..4).map(|i| record_for(0, 0, i)).collect();
        let mut block = RecordBlock::new(records);
        let bytes = block.compressed().unwrap().to_vec();

        assert!(matches!(
            RecordBlock::from_compressed_bytes(&bytes, 5),
            Err(StoreError::Malformed(_))
        ));
        assert!(matches!(
            RecordBlock::from_compressed_bytes(&bytes, 3),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn huge_triangle_count_is_malformed() {
        let mut block = RecordBlock::new(vec![record_for(0, 0, 0)]);
        let bytes = block.compressed().unwrap().to_vec();

        assert!(matches!(
            RecordBlock::from_compressed_bytes(&bytes, u32::MAX as usize),
            Err(StoreError::Malformed(_))
        ));
        assert!(matches!(
            RecordBlock::from_compressed_bytes(&bytes, usize::MAX),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn mutation_invalidates_cached_frame() {
        let mut block = RecordBlock::new(vec![record_for(1, 1, 0)]);
        let before = block.compressed().unwrap().to_vec();
        block.record_mut(0).unwrap().texture = 99;
        let after = block.compressed().unwrap().to_vec();
        assert_ne!(before, after);
    }

    #[test]
    fn materialized_triangles_know_their_cell() {
        let layout = GridLayout::new(9, 7);
        let key = SubMeshKey::new(41, 5);
        let mesh = SubMesh::new(layout, key, 41, vec![record_for(41, 5, 0)]);
        assert_eq!(mesh.triangles()[0].grid_coords(), cell_of(layout, key));
        assert!(mesh.triangles()[0].link().is_none());
    }
}
