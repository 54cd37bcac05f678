// File-backed layout storage
use crate::application::layout_storage::{LayoutStorage, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Keeps the layout JSON in one file. Writes go to a sibling temp file that
/// is renamed over the target so a crash never leaves half a layout behind.
#[derive(Debug, Clone)]
pub struct FileLayoutStorage {
    path: PathBuf,
}

impl FileLayoutStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LayoutStorage for FileLayoutStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::layout_service::TileLayoutManager;
    use std::sync::Arc;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileLayoutStorage::new(dir.path().join("dashboard_tiles.json"));
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileLayoutStorage::new(dir.path().join("nested/state/dashboard_tiles.json"));

        storage.write("[\"a\"]").unwrap();
        storage.write("[\"b\"]").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("[\"b\"]"));
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_layout_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard_tiles.json");

        let mut manager = TileLayoutManager::open(Arc::new(FileLayoutStorage::new(&path)));
        let added = manager.add();
        manager.reorder(&added.id, "overview");
        let expected = manager.tiles().to_vec();

        let reopened = TileLayoutManager::open(Arc::new(FileLayoutStorage::new(&path)));
        assert_eq!(reopened.tiles(), expected.as_slice());
        assert_eq!(reopened.tiles()[0].id, added.id);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard_tiles.json");
        fs::write(&path, "\u{0}\u{1}garbage").unwrap();

        let manager = TileLayoutManager::open(Arc::new(FileLayoutStorage::new(&path)));
        assert_eq!(manager.tiles(), crate::domain::tile::default_tiles().as_slice());
    }
}
