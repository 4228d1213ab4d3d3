use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding the `<stem>.MAP` and `<stem>.BOT` files of every map.
    pub data_root: PathBuf,
    /// Multiplier from raw map units to world space.
    pub world_scale: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            world_scale: 1.0 / 8.0,
        }
    }
}

impl EditorConfig {
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ron::Error> {
        let reader = std::fs::File::open(path)?;

        ron::de::from_reader(reader)
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
    use crate::test_util::TempDir;

    #[test]
    fn read_full_and_partial_files() {
        let dir = TempDir::new("config");

        let full = dir.path().join("full.ron");
        std::fs::write(&full, r#"(data_root: "maps/ff7", world_scale: 0.5)"#).unwrap();
        let config = EditorConfig::read_file(&full).unwrap();
        assert_eq!(config.data_root, PathBuf::from("maps/ff7"));
        assert_eq!(config.world_scale, 0.5);

        let partial = dir.path().join("partial.ron");
        std::fs::write(&partial, "(world_scale: 0.25)").unwrap();
        let config = EditorConfig::read_file(&partial).unwrap();
        assert_eq!(config.data_root, EditorConfig::default().data_root);
        assert_eq!(config.world_scale, 0.25);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new("config-missing");
        assert!(EditorConfig::read_file(dir.path().join("nope.ron")).is_err());
    }
}
