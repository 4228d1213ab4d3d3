use wmedit_map::{MapType, StoreError};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },
    #[error("bad editor config: {0}")]
    Config(#[from] ron::Error),
    #[error("the {0} map is not loaded")]
    NotLoaded(MapType),
    #[error("failed to load textures: {0}")]
    Textures(String),
}

impl EditorError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |error| Self::Io { path, error }
    }
}
