use crate::{
    config::MapConfig,
    section::{effective_variant, source_index, SectionIndex, SubMeshKey, Variant, MESHES_PER_SECTION},
    store::{MeshStore, StoreError},
    sub_mesh::{StoredSubMesh, SubMesh},
};

use rayon::prelude::*;
use wmedit_core::arena::{Arena32, ArenaId32};

/// Identity of a [`SubMesh`] in a document's arena.
pub type SubMeshId = ArenaId32;

/// The 16 sub-meshes of one section variant, in local mesh order.
pub type SectionMeshes = [SubMeshId; MESHES_PER_SECTION];

#[derive(Clone, Copy, Debug, Default)]
struct SectionSlot {
    base: Option<SectionMeshes>,
    /// A section belongs to at most one group, so one slot is enough.
    alternative: Option<SectionMeshes>,
}

/// # Section Variant Cache
///
/// Remembers which sub-meshes make up every loaded section variant. Variants are read from a [`MeshStore`] on first access
/// and retained until the cache is dropped; a retained id array is never rewritten, so toggling between variants always
/// yields the very same [`SubMeshId`]s.
pub struct SectionVariantCache {
    config: MapConfig,
    slots: Vec<SectionSlot>,
}

impl SectionVariantCache {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            slots: vec![SectionSlot::default(); config.layout.num_sections()],
        }
    }

    /// The variant that would actually be served for `(section, variant)` on this map.
    pub fn resolve(&self, section: SectionIndex, variant: Variant) -> Variant {
        if self.config.supports_alternatives() {
            effective_variant(section, variant)
        } else {
            Variant::Base
        }
    }

    /// Returns the cached meshes for `(section, variant)` without touching the store.
    pub fn cached(&self, section: SectionIndex, variant: Variant) -> Option<SectionMeshes> {
        let slot = self.slots.get(section)?;
        match self.resolve(section, variant) {
            Variant::Base => slot.base,
            Variant::Alternative(_) => slot.alternative,
        }
    }

    pub fn num_loaded_alternatives(&self) -> usize {
        self.slots.iter().filter(|s| s.alternative.is_some()).count()
    }

    /// Returns the meshes of `(section, variant)`, loading them on first access.
    pub fn get_variant(
        &mut self,
        meshes: &mut Arena32<SubMesh>,
        store: &impl MeshStore,
        section: SectionIndex,
        variant: Variant,
    ) -> Result<SectionMeshes, StoreError> {
        let [loaded] = self.load_variants(meshes, store, &[(section, variant)])?;
        Ok(loaded)
    }

    /// Like [`get_variant`](Self::get_variant) for many requests at once. All cache misses are read from `store` in parallel.
    /// If any read fails, nothing is inserted into the cache or the arena.
    pub fn load_variants<const N: usize>(
        &mut self,
        meshes: &mut Arena32<SubMesh>,
        store: &impl MeshStore,
        requests: &[(SectionIndex, Variant); N],
    ) -> Result<[SectionMeshes; N], StoreError> {
        let loaded = self.load_variant_list(meshes, store, requests)?;
        // Lengths match by construction.
        Ok(std::array::from_fn(|i| loaded[i]))
    }

    pub fn load_variant_list(
        &mut self,
        meshes: &mut Arena32<SubMesh>,
        store: &impl MeshStore,
        requests: &[(SectionIndex, Variant)],
    ) -> Result<Vec<SectionMeshes>, StoreError> {
        for &(section, _) in requests.iter() {
            if !self.config.layout.contains_section(section) {
                return Err(StoreError::Malformed(format!(
                    "section {} is outside of the {} map",
                    section, self.config.map_type
                )));
            }
        }

        let mut misses: Vec<(SectionIndex, Variant)> = requests
            .iter()
            .map(|&(section, variant)| (section, self.resolve(section, variant)))
            .filter(|&(section, variant)| self.cached(section, variant).is_none())
            .collect();
        misses.sort_by_key(|&(section, variant)| (section, variant != Variant::Base));
        misses.dedup();

        // Sections touch disjoint slots, so they can be read concurrently.
        let reads: Vec<(SectionIndex, Variant, Vec<StoredSubMesh>)> = misses
            .par_iter()
            .map(|&(section, variant)| {
                let source = source_index(section, variant);
                let stored = store.read_section(section, source)?;
                if stored.len() != MESHES_PER_SECTION {
                    return Err(StoreError::Malformed(format!(
                        "source {} returned {} sub-meshes",
                        source,
                        stored.len()
                    )));
                }
                Ok((section, variant, stored))
            })
            .collect::<Result<_, _>>()?;

        for (section, variant, stored) in reads.into_iter() {
            let ids = self.insert_variant(meshes, section, variant, stored);
            log::debug!("Loaded section {} {:?}", section, variant);
            let slot = &mut self.slots[section];
            match variant {
                Variant::Base => slot.base = Some(ids),
                Variant::Alternative(_) => slot.alternative = Some(ids),
            }
        }

        Ok(requests
            .iter()
            .filter_map(|&(section, variant)| self.cached(section, variant))
            .collect())
    }

    fn insert_variant(
        &self,
        meshes: &mut Arena32<SubMesh>,
        section: SectionIndex,
        variant: Variant,
        stored: Vec<StoredSubMesh>,
    ) -> SectionMeshes {
        let source = source_index(section, variant);
        let layout = self.config.layout;
        let mut stored = stored.into_iter();
        std::array::from_fn(|local| {
            let key = SubMeshKey::new(section, local as u8);
            let data = stored.next().unwrap_or_default();
            meshes.insert(SubMesh::from_stored(layout, key, source, data))
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
