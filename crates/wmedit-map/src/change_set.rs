use crate::{section::SubMeshKey, variant_cache::SubMeshId};

use wmedit_core::SmallKeyHashSet;

/// A sub-mesh waiting to be written back to the store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DirtyMesh {
    pub key: SubMeshKey,
    pub mesh: SubMeshId,
}

/// # Change Set
///
/// Tracks which sub-meshes have unsaved edits. Each [`SubMeshKey`] is recorded at most once, and pending entries keep the order
/// in which they were first marked.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    tracked: SmallKeyHashSet<u32>,
    ordered: Vec<DirtyMesh>,
}

impl ChangeSet {
    /// Returns `true` if `key` was not tracked before.
    pub fn mark_dirty(&mut self, key: SubMeshKey, mesh: SubMeshId) -> bool {
        if !self.tracked.insert(key.packed()) {
            return false;
        }
        self.ordered.push(DirtyMesh { key, mesh });
        true
    }

    pub fn pending(&self) -> &[DirtyMesh] {
        &self.ordered
    }

    pub fn contains(&self, key: SubMeshKey) -> bool {
        self.tracked.contains(&key.packed())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracked.clear();
        self.ordered.clear();
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
