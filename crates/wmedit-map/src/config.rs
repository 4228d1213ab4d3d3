use crate::section::{SectionIndex, SECTION_EDGE_MESHES};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of world map.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum MapType {
    Overworld,
    Underwater,
    Glacier,
}

impl MapType {
    pub const ALL: [MapType; 3] = [MapType::Overworld, MapType::Underwater, MapType::Glacier];

    pub fn config(self) -> MapConfig {
        match self {
            MapType::Overworld => MapConfig {
                map_type: self,
                type_id: 0,
                layout: GridLayout::new(9, 7),
                file_stem: "WM0",
            },
            MapType::Underwater => MapConfig {
                map_type: self,
                type_id: 2,
                layout: GridLayout::new(3, 4),
                file_stem: "WM2",
            },
            MapType::Glacier => MapConfig {
                map_type: self,
                type_id: 3,
                layout: GridLayout::new(2, 2),
                file_stem: "WM3",
            },
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Static description of one map type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MapConfig {
    pub map_type: MapType,
    pub type_id: u8,
    pub layout: GridLayout,
    /// Output files are `<file_stem>.MAP` (geometry) and `<file_stem>.BOT` (auxiliary).
    pub file_stem: &'static str,
}

impl MapConfig {
    /// Only the overworld has alternative sections.
    pub fn supports_alternatives(&self) -> bool {
        self.map_type == MapType::Overworld
    }
}

/// Dimensions of a map, measured in sections.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GridLayout {
    pub sections_x: usize,
    pub sections_z: usize,
}

impl GridLayout {
    pub const fn new(sections_x: usize, sections_z: usize) -> Self {
        Self {
            sections_x,
            sections_z,
        }
    }

    pub fn num_sections(&self) -> usize {
        self.sections_x * self.sections_z
    }

    pub fn rows(&self) -> usize {
        self.sections_z * SECTION_EDGE_MESHES
    }

    pub fn columns(&self) -> usize {
        self.sections_x * SECTION_EDGE_MESHES
    }

    pub fn contains_section(&self, section: SectionIndex) -> bool {
        section < self.num_sections()
    }
}
