use crate::EditorError;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use wmedit_map::{MapConfig, MapFile};

/// The two files that make up one map on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MapPaths {
    pub geometry: PathBuf,
    pub auxiliary: PathBuf,
}

impl MapPaths {
    pub fn new(data_root: &Path, config: &MapConfig) -> Self {
        Self {
            geometry: data_root.join(format!("{}.MAP", config.file_stem)),
            auxiliary: data_root.join(format!("{}.BOT", config.file_stem)),
        }
    }

    pub fn read(&self) -> Result<MapFile, EditorError> {
        let geometry = fs::read(&self.geometry).map_err(EditorError::io(&self.geometry))?;
        let auxiliary = fs::read(&self.auxiliary).map_err(EditorError::io(&self.auxiliary))?;
        log::debug!("Read {} + {} bytes from {:?}", geometry.len(), auxiliary.len(), self.geometry);

        Ok(MapFile::decode(&geometry, &auxiliary)?)
    }

    /// Writes both streams next to their destinations, then renames them into place. If either temporary file can't be
    /// written, the existing files are left alone. If the second rename fails, the previous geometry file is restored so
    /// the pair on disk stays consistent.
    pub fn write(&self, geometry: &[u8], auxiliary: &[u8]) -> Result<(), EditorError> {
        let geometry_tmp = temp_path(&self.geometry, "tmp");
        let auxiliary_tmp = temp_path(&self.auxiliary, "tmp");

        let written = fs::write(&geometry_tmp, geometry)
            .map_err(EditorError::io(&geometry_tmp))
            .and_then(|()| fs::write(&auxiliary_tmp, auxiliary).map_err(EditorError::io(&auxiliary_tmp)));
        if let Err(e) = written {
            let _ = fs::remove_file(&geometry_tmp);
            let _ = fs::remove_file(&auxiliary_tmp);
            return Err(e);
        }

        let result = self.replace_pair(&geometry_tmp, &auxiliary_tmp, |from, to| fs::rename(from, to));
        if result.is_err() {
            let _ = fs::remove_file(&geometry_tmp);
            let _ = fs::remove_file(&auxiliary_tmp);
        }
        result
    }

    /// Moves both temporary files into place. The old geometry file is kept as a backup until the auxiliary file has been
    /// replaced as well.
    fn replace_pair(
        &self,
        geometry_tmp: &Path,
        auxiliary_tmp: &Path,
        mut rename: impl FnMut(&Path, &Path) -> io::Result<()>,
    ) -> Result<(), EditorError> {
        let backup = temp_path(&self.geometry, "bak");
        let has_backup = self.geometry.exists();
        if has_backup {
            rename(&self.geometry, &backup).map_err(EditorError::io(&backup))?;
        }

        let restore = |rename: &mut dyn FnMut(&Path, &Path) -> io::Result<()>| {
            let restored = if has_backup {
                rename(&backup, &self.geometry)
            } else {
                fs::remove_file(&self.geometry).or_else(|e| match e.kind() {
                    io::ErrorKind::NotFound => Ok(()),
                    _ => Err(e),
                })
            };
            if let Err(e) = restored {
                log::error!("Failed to restore {:?}: {}", self.geometry, e);
            }
        };

        if let Err(e) = rename(geometry_tmp, &self.geometry) {
            restore(&mut rename);
            return Err(EditorError::io(&self.geometry)(e));
        }
        if let Err(e) = rename(auxiliary_tmp, &self.auxiliary) {
            log::warn!("Failed to replace {:?}; restoring {:?}", self.auxiliary, self.geometry);
            restore(&mut rename);
            return Err(EditorError::io(&self.auxiliary)(e));
        }

        if has_backup {
            if let Err(e) = fs::remove_file(&backup) {
                log::warn!("Failed to remove {:?}: {}", backup, e);
            }
        }
        Ok(())
    }
}

/// `path` with `.<extension>` appended to its file name.
fn temp_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(extension);
    path.with_file_name(name)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
