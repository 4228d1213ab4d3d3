use ndshape::{ConstShape, ConstShape2u32};
use wmedit_core::static_assertions::const_assert_eq;

/// Linear index of a section, row-major over the section grid of a map.
pub type SectionIndex = usize;

/// Index of a sub-mesh within its section, in `[0, 16)`. See [`SectionShape`].
pub type LocalMeshIndex = u8;

/// The slot of the backing store that a section variant is read from.
pub type SourceIndex = usize;

/// One of the [`NUM_ALTERNATIVE_GROUPS`] progression groups.
pub type GroupId = u8;

/// The 4×4 layout of sub-meshes inside a section. Coordinates are `[local_column, local_row]`.
pub type SectionShape = ConstShape2u32<4, 4>;
pub const MESHES_PER_SECTION: usize = SectionShape::USIZE;
pub const SECTION_EDGE_MESHES: usize = 4;
const_assert_eq!(MESHES_PER_SECTION, SECTION_EDGE_MESHES * SECTION_EDGE_MESHES);

/// Number of base sections stored ahead of the alternates in an overworld store.
pub const BASE_SECTION_COUNT: usize = 63;

pub const NUM_ALTERNATIVE_GROUPS: usize = 4;

/// Section membership of each alternative group, indexed by [`GroupId`].
pub const ALTERNATIVE_GROUPS: [&[SectionIndex]; NUM_ALTERNATIVE_GROUPS] = [&[50], &[41, 42], &[60], &[47, 48]];

/// The global order of alternate sections. A section's position here is its "order index", which locates its alternate
/// meshes at source `BASE_SECTION_COUNT + order_index`.
pub const ALTERNATIVE_SECTION_ORDER: [SectionIndex; 6] = [50, 41, 42, 60, 47, 48];

/// Which version of a section's meshes is wanted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Variant {
    Base,
    Alternative(GroupId),
}

/// Returns the group that `section` participates in, if any.
pub fn group_of_section(section: SectionIndex) -> Option<GroupId> {
    ALTERNATIVE_GROUPS
        .iter()
        .position(|members| members.contains(&section))
        .map(|g| g as GroupId)
}

pub fn sections_in_group(group: GroupId) -> &'static [SectionIndex] {
    ALTERNATIVE_GROUPS
        .get(group as usize)
        .copied()
        .unwrap_or(&[])
}

pub fn order_index(section: SectionIndex) -> Option<usize> {
    ALTERNATIVE_SECTION_ORDER.iter().position(|&s| s == section)
}

pub fn is_alternative_section(section: SectionIndex) -> bool {
    order_index(section).is_some()
}

/// Resolves the variant actually served for a request. Asking for a group that `section` does not belong to falls back to
/// the base variant.
pub fn effective_variant(section: SectionIndex, variant: Variant) -> Variant {
    match variant {
        Variant::Alternative(group) if group_of_section(section) == Some(group) => variant,
        _ => Variant::Base,
    }
}

/// The store slot holding `variant` of `section`. Callers should pass an [`effective_variant`].
pub fn source_index(section: SectionIndex, variant: Variant) -> SourceIndex {
    match variant {
        Variant::Base => section,
        Variant::Alternative(_) => match order_index(section) {
            Some(order) => BASE_SECTION_COUNT + order,
            None => section,
        },
    }
}

/// Identity of a sub-mesh for dirty tracking: `(section, local mesh)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubMeshKey {
    pub section: SectionIndex,
    pub local: LocalMeshIndex,
}

impl SubMeshKey {
    pub fn new(section: SectionIndex, local: LocalMeshIndex) -> Self {
        Self { section, local }
    }

    /// A stable scalar key: the section in the high bits and the local mesh in the low 4 bits.
    pub fn packed(&self) -> u32 {
        ((self.section as u32) << 4) | (self.local as u32 & 0xF)
    }

    /// `[local_column, local_row]` inside the section.
    pub fn local_coords(&self) -> [u32; 2] {
        SectionShape::delinearize(self.local as u32)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
