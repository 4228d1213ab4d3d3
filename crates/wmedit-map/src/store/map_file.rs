use super::{MeshStore, StoreError};
use crate::{
    section::{SectionIndex, SourceIndex, MESHES_PER_SECTION},
    sub_mesh::{RecordBlock, RecordBlockHandle, StoredSubMesh, SubMesh},
    triangle::TriangleRecord,
};

use bytemuck::{bytes_of, pod_read_unaligned, Pod, Zeroable};
use parking_lot::RwLock;
use wmedit_core::static_assertions::const_assert_eq;
use std::mem;
use std::sync::Arc;

const AUX_MAGIC: [u8; 4] = *b"WMBT";
const AUX_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct AuxHeader {
    magic: [u8; 4],
    version: u32,
    sources: u32,
}

/// Locates the LZ4 frame of one sub-mesh inside the geometry stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct BlockEntry {
    offset: u32,
    length: u32,
    triangles: u32,
}

const_assert_eq!(mem::size_of::<AuxHeader>(), 12);
const_assert_eq!(mem::size_of::<BlockEntry>(), 12);

impl BlockEntry {
    fn from_le(self) -> Self {
        Self {
            offset: u32::from_le(self.offset),
            length: u32::from_le(self.length),
            triangles: u32::from_le(self.triangles),
        }
    }

    fn to_le(self) -> Self {
        Self {
            offset: self.offset.to_le(),
            length: self.length.to_le(),
            triangles: self.triangles.to_le(),
        }
    }
}

/// # Map File
///
/// An in-memory [`MeshStore`] backed by two byte streams.
///
/// ## Auxiliary stream
///
/// A 12-byte header (`b"WMBT"`, version, number of sources) followed by one 12-byte entry per sub-mesh block, ordered by
/// `source * 16 + local mesh`. Each entry holds the block's offset and length in the geometry stream and its triangle count.
///
/// ## Geometry stream
///
/// The concatenated LZ4 frames of every block. A frame decompresses to the raw [`TriangleRecord`]s of that block.
///
/// Blocks are shared with the triangles read from this store through weak [`RecordLink`](crate::RecordLink)s, so edits to
/// linked triangles land here directly.
pub struct MapFile {
    blocks: Vec<RecordBlockHandle>,
}

impl MapFile {
    /// Builds a store from uncompressed records. Every source must have exactly 16 blocks.
    pub fn from_sources(sources: Vec<Vec<Vec<TriangleRecord>>>) -> Result<Self, StoreError> {
        let mut blocks = Vec::with_capacity(sources.len() * MESHES_PER_SECTION);
        for (source_index, meshes) in sources.into_iter().enumerate() {
            if meshes.len() != MESHES_PER_SECTION {
                return Err(StoreError::Malformed(format!(
                    "source {} has {} sub-meshes",
                    source_index,
                    meshes.len()
                )));
            }
            blocks.extend(
                meshes
                    .into_iter()
                    .map(|records| Arc::new(RwLock::new(RecordBlock::new(records)))),
            );
        }
        Ok(Self { blocks })
    }

    pub fn decode(geometry: &[u8], auxiliary: &[u8]) -> Result<Self, StoreError> {
        let header_size = mem::size_of::<AuxHeader>();
        let entry_size = mem::size_of::<BlockEntry>();

        if auxiliary.len() < header_size {
            return Err(StoreError::Malformed("auxiliary stream is too short".into()));
        }
        let header: AuxHeader = pod_read_unaligned(&auxiliary[..header_size]);
        if header.magic != AUX_MAGIC {
            return Err(StoreError::Malformed("bad auxiliary magic".into()));
        }
        let version = u32::from_le(header.version);
        if version != AUX_VERSION {
            return Err(StoreError::Malformed(format!("unsupported version {}", version)));
        }

        let num_blocks = u32::from_le(header.sources) as usize * MESHES_PER_SECTION;
        let table = &auxiliary[header_size..];
        if table.len() != num_blocks * entry_size {
            return Err(StoreError::Malformed(format!(
                "expected {} block entries, found {} bytes",
                num_blocks,
                table.len()
            )));
        }

        let mut blocks = Vec::with_capacity(num_blocks);
        for entry_bytes in table.chunks_exact(entry_size) {
            let entry = pod_read_unaligned::<BlockEntry>(entry_bytes).from_le();
            let start = entry.offset as usize;
            let end = start + entry.length as usize;
            let frame = geometry.get(start..end).ok_or_else(|| {
                StoreError::Malformed(format!("block {}..{} is out of bounds", start, end))
            })?;
            let block = RecordBlock::from_compressed_bytes(frame, entry.triangles as usize)?;
            blocks.push(Arc::new(RwLock::new(block)));
        }

        log::debug!("Decoded map file with {} blocks", blocks.len());

        Ok(Self { blocks })
    }

    pub fn block(&self, source: SourceIndex, local: usize) -> Option<&RecordBlockHandle> {
        if local >= MESHES_PER_SECTION {
            return None;
        }
        self.blocks.get(source * MESHES_PER_SECTION + local)
    }

    /// Visits the compressed frame and triangle count of every block, in stream order.
    fn visit_frames(&self, mut visitor: impl FnMut(&[u8], u32)) -> Result<(), StoreError> {
        for block in self.blocks.iter() {
            let mut block = block.write();
            let triangles = block.records().len() as u32;
            visitor(block.compressed()?, triangles);
        }
        Ok(())
    }
}

impl MeshStore for MapFile {
    fn num_sources(&self) -> usize {
        self.blocks.len() / MESHES_PER_SECTION
    }

    fn read_section(&self, section: SectionIndex, source: SourceIndex) -> Result<Vec<StoredSubMesh>, StoreError> {
        if source >= self.num_sources() {
            return Err(StoreError::MissingSource {
                source_index: source,
            });
        }
        log::trace!("Reading section {} from source {}", section, source);

        let start = source * MESHES_PER_SECTION;
        Ok(self.blocks[start..start + MESHES_PER_SECTION]
            .iter()
            .map(|block| StoredSubMesh {
                records: block.read().records().to_vec(),
                block: Some(Arc::downgrade(block)),
            })
            .collect())
    }

    fn write_sub_mesh(&mut self, sub_mesh: &SubMesh) -> Result<(), StoreError> {
        let key = sub_mesh.key();
        let block = self
            .block(sub_mesh.source(), key.local as usize)
            .ok_or(StoreError::MissingSource {
                source_index: sub_mesh.source(),
            })?;
        block.write().replace_records(sub_mesh.records());
        Ok(())
    }

    fn serialize_geometry(&self) -> Result<Vec<u8>, StoreError> {
        let mut bytes = Vec::new();
        self.visit_frames(|frame, _| bytes.extend_from_slice(frame))?;
        Ok(bytes)
    }

    fn serialize_auxiliary(&self) -> Result<Vec<u8>, StoreError> {
        let header = AuxHeader {
            magic: AUX_MAGIC,
            version: AUX_VERSION.to_le(),
            sources: (self.num_sources() as u32).to_le(),
        };
        let mut bytes = bytes_of(&header).to_vec();

        let mut offset = 0u32;
        self.visit_frames(|frame, triangles| {
            let entry = BlockEntry {
                offset,
                length: frame.len() as u32,
                triangles,
            };
            bytes.extend_from_slice(bytes_of(&entry.to_le()));
            offset += frame.len() as u32;
        })?;

        Ok(bytes)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
