use crate::{
    coordinates::{coords_from_offset, GridCoords},
    sub_mesh::RecordBlock,
};

use bytemuck::{Pod, Zeroable};
use parking_lot::RwLock;
use wmedit_core::static_assertions::const_assert_eq;
use std::mem;
use std::sync::Weak;
use wmedit_core::glam::{IVec2, Vec2, Vec3};

/// The serialization-facing form of one triangle. Logical triangles and backing store blocks both hold this exact layout, so
/// "in sync" means bytewise equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TriangleRecord {
    pub terrain: u32,
    pub region: u32,
    pub script: u32,
    /// Nonzero iff chocobos may roam on this triangle.
    pub chocobo: u32,
    pub texture: u32,
    pub uvs: [[f32; 2]; 3],
    pub vertices: [[f32; 3]; 3],
    pub normals: [[f32; 3]; 3],
}

const_assert_eq!(mem::size_of::<TriangleRecord>(), 116);

/// A sparse, partial update of triangle attributes. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleUpdate {
    pub terrain: Option<u32>,
    pub region: Option<u32>,
    pub script: Option<u32>,
    pub chocobo: Option<bool>,
    pub texture: Option<u32>,
    pub uvs: [Option<Vec2>; 3],
    pub normals: [Option<Vec3>; 3],
}

/// What kinds of derived data an applied [`TriangleUpdate`] invalidates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UpdateEffects {
    pub retextured: bool,
    pub renormaled: bool,
}

impl TriangleUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The one field merge routine. Both the logical record and its linked copy go through here.
    ///
    /// Effects are reported only for values that actually changed; writing a field's current value is not an effect.
    pub fn apply_to(&self, record: &mut TriangleRecord) -> UpdateEffects {
        let before = *record;
        if let Some(terrain) = self.terrain {
            record.terrain = terrain;
        }
        if let Some(region) = self.region {
            record.region = region;
        }
        if let Some(script) = self.script {
            record.script = script;
        }
        if let Some(chocobo) = self.chocobo {
            record.chocobo = chocobo as u32;
        }
        if let Some(texture) = self.texture {
            record.texture = texture;
        }
        for (dst, src) in record.uvs.iter_mut().zip(self.uvs.iter()) {
            if let Some(uv) = src {
                *dst = uv.to_array();
            }
        }
        for (dst, src) in record.normals.iter_mut().zip(self.normals.iter()) {
            if let Some(n) = src {
                *dst = n.to_array();
            }
        }

        UpdateEffects {
            retextured: record.texture != before.texture || record.uvs != before.uvs,
            renormaled: record.normals != before.normals,
        }
    }
}

/// A non-owning reference to a triangle's record inside a backing store block.
#[derive(Clone, Debug)]
pub struct RecordLink {
    block: Weak<RwLock<RecordBlock>>,
    index: u32,
}

impl RecordLink {
    pub fn new(block: Weak<RwLock<RecordBlock>>, index: u32) -> Self {
        Self { block, index }
    }

    /// Runs `f` on the linked record. Returns `None` if the store has been dropped or the record no longer exists.
    pub fn with_record_mut<T>(&self, f: impl FnOnce(&mut TriangleRecord) -> T) -> Option<T> {
        let block = self.block.upgrade()?;
        let mut block = block.write();
        block.record_mut(self.index as usize).map(f)
    }

    pub fn read(&self) -> Option<TriangleRecord> {
        let block = self.block.upgrade()?;
        let block = block.read();
        block.records().get(self.index as usize).copied()
    }
}

/// A triangle owned by one [`SubMesh`](crate::SubMesh).
#[derive(Clone, Debug)]
pub struct Triangle {
    record: TriangleRecord,
    /// `(x, z)` offset of the owning sub-mesh in raw map units.
    mesh_offset: IVec2,
    link: Option<RecordLink>,
}

impl Triangle {
    pub fn new(record: TriangleRecord, mesh_offset: IVec2) -> Self {
        Self {
            record,
            mesh_offset,
            link: None,
        }
    }

    pub fn new_linked(record: TriangleRecord, mesh_offset: IVec2, link: RecordLink) -> Self {
        Self {
            record,
            mesh_offset,
            link: Some(link),
        }
    }

    #[inline]
    pub fn record(&self) -> &TriangleRecord {
        &self.record
    }

    pub fn mesh_offset(&self) -> IVec2 {
        self.mesh_offset
    }

    /// The grid cell of the owning sub-mesh.
    pub fn grid_coords(&self) -> GridCoords {
        coords_from_offset(self.mesh_offset)
    }

    pub fn link(&self) -> Option<&RecordLink> {
        self.link.as_ref()
    }

    /// A copy of the linked record, if there is one and it is still reachable.
    pub fn linked_record(&self) -> Option<TriangleRecord> {
        self.link.as_ref().and_then(RecordLink::read)
    }

    pub fn terrain(&self) -> u32 {
        self.record.terrain
    }

    pub fn region(&self) -> u32 {
        self.record.region
    }

    pub fn script(&self) -> u32 {
        self.record.script
    }

    pub fn chocobo(&self) -> bool {
        self.record.chocobo != 0
    }

    pub fn texture(&self) -> u32 {
        self.record.texture
    }

    pub fn uv(&self, i: usize) -> Vec2 {
        Vec2::from(self.record.uvs[i])
    }

    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::from(self.record.vertices[i])
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        self.record.vertices.map(Vec3::from)
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::from(self.record.normals[i])
    }

    /// Merges `update` into the logical record, then into the linked record if one is reachable.
    pub fn apply(&mut self, update: &TriangleUpdate) -> UpdateEffects {
        let effects = update.apply_to(&mut self.record);
        if let Some(link) = &self.link {
            if link.with_record_mut(|r| update.apply_to(r)).is_none() {
                log::debug!("Triangle link is gone; skipping mirror");
            }
        }
        effects
    }

    /// Position-only write. Does not touch the linked record; see [`Triangle::sync_link`].
    pub fn set_vertices(&mut self, vertices: [Vec3; 3]) {
        self.record.vertices = vertices.map(|v| v.to_array());
    }

    /// Overwrites the linked record with the logical one. Returns `false` when there is nothing to sync.
    pub fn sync_link(&self) -> bool {
        match &self.link {
            Some(link) => link.with_record_mut(|r| *r = self.record).is_some(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::bytes_of;
    use std::sync::Arc;

    fn sample_record() -> TriangleRecord {
        TriangleRecord {
            terrain: 1,
            region: 2,
            script: 3,
            chocobo: 0,
            texture: 4,
            uvs: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vertices: [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 0.0, 10.0]],
            normals: [[0.0, 1.0, 0.0]; 3],
        }
    }

    #[test]
    fn update_is_a_merge() {
        let mut record = sample_record();
        let update = TriangleUpdate {
            region: Some(9),
            chocobo: Some(true),
            ..Default::default()
        };
        let effects = update.apply_to(&mut record);

        assert_eq!(effects, UpdateEffects::default());
        assert_eq!(record.region, 9);
        assert_eq!(record.chocobo, 1);
        assert_eq!(record.terrain, 1);
        assert_eq!(record.texture, 4);
    }

    #[test]
    fn partial_uv_and_normal_updates_report_effects() {
        let mut record = sample_record();
        let mut update = TriangleUpdate::default();
        update.uvs[2] = Some(Vec2::new(0.5, 0.25));
        update.normals[0] = Some(Vec3::X);

        let effects = update.apply_to(&mut record);

        assert!(effects.retextured && effects.renormaled);
        assert_eq!(record.uvs, [[0.0, 0.0], [1.0, 0.0], [0.5, 0.25]]);
        assert_eq!(record.normals[0], [1.0, 0.0, 0.0]);
        assert_eq!(record.normals[1], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn rewriting_current_values_has_no_effects() {
        let mut record = sample_record();
        let mut update = TriangleUpdate {
            texture: Some(4),
            ..Default::default()
        };
        update.uvs[1] = Some(Vec2::X);
        update.normals[2] = Some(Vec3::Y);

        assert_eq!(update.apply_to(&mut record), UpdateEffects::default());
        assert_eq!(record, sample_record());
    }

    #[test]
    fn linked_triangle_mirrors_every_update() {
        let block = Arc::new(RwLock::new(RecordBlock::new(vec![sample_record(); 2])));
        let link = RecordLink::new(Arc::downgrade(&block), 1);
        let mut tri = Triangle::new_linked(sample_record(), IVec2::ZERO, link);

        let mut update = TriangleUpdate {
            texture: Some(12),
            script: Some(77),
            ..Default::default()
        };
        update.uvs[0] = Some(Vec2::new(0.3, 0.7));
        tri.apply(&update);

        let mirrored = block.read().records()[1];
        assert_eq!(bytes_of(&mirrored), bytes_of(tri.record()));
        // The other record in the block is untouched.
        assert_eq!(block.read().records()[0], sample_record());
    }

    #[test]
    fn dropped_store_skips_mirror() {
        let block = Arc::new(RwLock::new(RecordBlock::new(vec![sample_record()])));
        let link = RecordLink::new(Arc::downgrade(&block), 0);
        let mut tri = Triangle::new_linked(sample_record(), IVec2::ZERO, link);
        drop(block);

        tri.apply(&TriangleUpdate {
            terrain: Some(5),
            ..Default::default()
        });
        assert_eq!(tri.terrain(), 5);
        assert!(tri.linked_record().is_none());
        assert!(!tri.sync_link());
    }

    #[test]
    fn grid_coords_from_offset() {
        let tri = Triangle::new(sample_record(), IVec2::new(3 * 8192, 2 * 8192));
        assert_eq!(tri.grid_coords(), GridCoords::new(2, 3));
    }
}
