//! The world map section/mesh grid store.
//!
//! # Sections and Sub-meshes
//!
//! A map is partitioned into rectangular [sections](crate::SectionIndex), and every section is subdivided into a 4×4 grid of
//! [`SubMesh`](crate::SubMesh)es. The [`MeshGrid`](crate::MeshGrid) is the full world assembled from those sub-meshes, where
//! cell `(row, column)` belongs to section `(row / 4, column / 4)`. Sub-meshes are the unit of dirty tracking and
//! persistence.
//!
//! ## Alternative Groups
//!
//! Some overworld sections have alternate versions that reflect game progression. They are organized into four mutually
//! exclusive [alternative groups](crate::ALTERNATIVE_GROUPS). Enabling a group swaps each of its sections' 16 grid cells for
//! the alternate meshes, which are loaded from the backing store on first use and then retained by the
//! [`SectionVariantCache`](crate::SectionVariantCache).
//!
//! ## Triangles
//!
//! Every [`Triangle`](crate::Triangle) holds its own logical [`TriangleRecord`](crate::TriangleRecord) and, when it was read
//! from a [`MeshStore`](crate::MeshStore), a weak link to the store's serialization-facing copy. All attribute edits go
//! through the [`TriangleRouter`](crate::TriangleRouter), which applies one sparse [`TriangleUpdate`](crate::TriangleUpdate)
//! to both records so they never diverge.
//!
//! ## Documents
//!
//! A [`MapDocument`](crate::MapDocument) ties everything together for one [`MapType`](crate::MapType): the sub-mesh arena,
//! variant cache, grid, triangle index, [`ChangeSet`](crate::ChangeSet) and [`SelectionSet`](crate::SelectionSet).

mod change_set;
mod config;
mod coordinates;
mod document;
mod grid;
mod groups;
mod router;
mod section;
mod selection;
mod store;
mod sub_mesh;
mod triangle;
mod triangle_index;
mod units;
mod variant_cache;

#[cfg(test)]
mod test_util;

pub use change_set::*;
pub use config::*;
pub use coordinates::*;
pub use document::*;
pub use grid::*;
pub use groups::*;
pub use router::*;
pub use section::*;
pub use selection::*;
pub use store::*;
pub use sub_mesh::*;
pub use triangle::*;
pub use triangle_index::*;
pub use units::*;
pub use variant_cache::*;

pub use wmedit_core as core;
pub use wmedit_core::glam;
