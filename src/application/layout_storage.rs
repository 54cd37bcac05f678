// Storage trait for the persisted tile layout
use std::sync::Mutex;

/// Key the layout is stored under
pub const STORAGE_KEY: &str = "dashboard_tiles";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode layout: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value slot holding the serialized layout, in the manner of
/// browser local storage: read on startup, overwritten on every mutation.
pub trait LayoutStorage: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet
    fn read(&self) -> Result<Option<String>, StorageError>;

    fn write(&self, contents: &str) -> Result<(), StorageError>;
}

/// Volatile storage used when no layout file is configured
#[derive(Debug, Default)]
pub struct MemoryLayoutStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryLayoutStorage {
    #[cfg(test)]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }
}

impl LayoutStorage for MemoryLayoutStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }
}
