use crate::section::{
    group_of_section, is_alternative_section, sections_in_group, GroupId, SectionIndex, Variant,
};

use itertools::Itertools;
use smallvec::SmallVec;

/// A sorted set of alternative groups.
pub type GroupSet = SmallVec<[GroupId; 4]>;

/// Sorts and de-duplicates a requested section list, dropping every section that has no alternate version.
pub fn normalize_sections(requested: &[SectionIndex]) -> Vec<SectionIndex> {
    requested
        .iter()
        .copied()
        .sorted()
        .dedup()
        .filter(|&section| {
            let known = is_alternative_section(section);
            if !known {
                log::warn!("Section {} has no alternate version; ignoring it", section);
            }
            known
        })
        .collect()
}

/// The sorted groups that `sections` participate in.
pub fn groups_of(sections: &[SectionIndex]) -> GroupSet {
    sections
        .iter()
        .filter_map(|&s| group_of_section(s))
        .sorted()
        .dedup()
        .collect()
}

/// The outcome of an alternative group request that changes something.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GroupTransition {
    pub enable: GroupSet,
    pub disable: GroupSet,
    /// The new active section set, normalized.
    pub sections: Vec<SectionIndex>,
    /// The new active group set.
    pub groups: GroupSet,
}

impl GroupTransition {
    /// `true` if the grid needs no changes, only the recorded section set.
    pub fn is_bookkeeping_only(&self) -> bool {
        self.enable.is_empty() && self.disable.is_empty()
    }

    /// Every `(section, variant)` that must be placed in the grid, disabled groups first.
    pub fn replacements(&self) -> impl Iterator<Item = (SectionIndex, Variant)> + '_ {
        let disabled = self
            .disable
            .iter()
            .flat_map(|&g| sections_in_group(g).iter().map(|&s| (s, Variant::Base)));
        let enabled = self
            .enable
            .iter()
            .flat_map(|&g| sections_in_group(g).iter().map(move |&s| (s, Variant::Alternative(g))));
        disabled.chain(enabled)
    }
}

/// # Alternative Group Resolver
///
/// Compares a requested section set with the previous state. Returns `None` when nothing changes at all.
pub fn resolve_groups(
    prev_sections: &[SectionIndex],
    prev_groups: &[GroupId],
    requested: &[SectionIndex],
) -> Option<GroupTransition> {
    let sections = normalize_sections(requested);
    let groups = groups_of(&sections);

    if sections == prev_sections && groups.as_slice() == prev_groups {
        return None;
    }

    let enable = groups.iter().copied().filter(|g| !prev_groups.contains(g)).collect();
    let disable = prev_groups.iter().copied().filter(|g| !groups.contains(g)).collect();

    Some(GroupTransition {
        enable,
        disable,
        sections,
        groups,
    })
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
