//! A world map editor core: loads section/mesh grid maps from disk, routes edits to the active map and saves them back.

mod config;
mod editor;
mod error;
mod persistence;

#[cfg(test)]
mod test_util;

pub use config::EditorConfig;
pub use editor::{EditMode, Editor, LoadedMap, NoTextures, Pick, TextureSource};
pub use error::EditorError;
pub use persistence::MapPaths;

pub use wmedit_map as map;
