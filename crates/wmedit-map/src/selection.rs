use crate::{
    triangle::{Triangle, TriangleUpdate},
    triangle_index::FaceIndex,
};

use std::collections::BTreeSet;
use wmedit_core::glam::Vec2;

/// The texture mapping of one triangle, as copied by [`SelectionSet::copy`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureSnapshot {
    pub texture: u32,
    pub uvs: [Vec2; 3],
}

impl TextureSnapshot {
    pub fn of(triangle: &Triangle) -> Self {
        Self {
            texture: triangle.texture(),
            uvs: [triangle.uv(0), triangle.uv(1), triangle.uv(2)],
        }
    }

    pub fn to_update(&self) -> TriangleUpdate {
        TriangleUpdate {
            texture: Some(self.texture),
            uvs: self.uvs.map(Some),
            ..Default::default()
        }
    }
}

/// # Selection Set
///
/// Faces selected for painting. Iteration is always in ascending face order.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    faces: BTreeSet<FaceIndex>,
}

impl SelectionSet {
    pub fn toggle(&mut self, face: FaceIndex, selected: bool) {
        if selected {
            self.faces.insert(face);
        } else {
            self.faces.remove(&face);
        }
    }

    pub fn add_many(&mut self, faces: impl IntoIterator<Item = FaceIndex>) {
        self.faces.extend(faces);
    }

    pub fn remove_many(&mut self, faces: impl IntoIterator<Item = FaceIndex>) {
        for face in faces {
            self.faces.remove(&face);
        }
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }

    pub fn contains(&self, face: FaceIndex) -> bool {
        self.faces.contains(&face)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FaceIndex> + '_ {
        self.faces.iter().copied()
    }

    /// Snapshots every selected face that `lookup` can resolve.
    pub fn copy<'t>(&self, lookup: impl Fn(FaceIndex) -> Option<&'t Triangle>) -> Vec<TextureSnapshot> {
        self.iter().filter_map(|face| lookup(face).map(TextureSnapshot::of)).collect()
    }

    /// Pairs the i-th selected face with `snapshots[i % len]`. Empty if there is nothing to paste.
    pub fn paste_plan(&self, snapshots: &[TextureSnapshot]) -> Vec<(FaceIndex, TriangleUpdate)> {
        if snapshots.is_empty() {
            return Vec::new();
        }
        self.iter()
            .zip(snapshots.iter().cycle())
            .map(|(face, snapshot)| (face, snapshot.to_update()))
            .collect()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
