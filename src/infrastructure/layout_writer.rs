// Background layout persistence
use crate::application::layout_storage::{LayoutStorage, STORAGE_KEY, StorageError};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    version: u64,
    contents: String,
}

/// Wraps a blocking storage so layout mutations never touch the disk on an
/// async worker. `write` only records the newest snapshot; a background task
/// hands it to the blocking pool. Snapshots that arrive while a write is in
/// flight collapse into the latest one.
pub struct LayoutWriter {
    inner: Arc<dyn LayoutStorage>,
    pending: watch::Sender<Snapshot>,
    written: watch::Receiver<u64>,
}

impl LayoutWriter {
    /// Needs a running tokio runtime
    pub fn spawn(inner: Arc<dyn LayoutStorage>) -> Arc<Self> {
        let (pending, mut queue) = watch::channel(Snapshot::default());
        let (done, written) = watch::channel(0u64);
        let storage = inner.clone();

        tokio::spawn(async move {
            while queue.changed().await.is_ok() {
                let snapshot = queue.borrow_and_update().clone();
                let target = storage.clone();
                let contents = snapshot.contents;
                match tokio::task::spawn_blocking(move || target.write(&contents)).await {
                    Ok(Ok(())) => tracing::debug!("Persisted {} (version {})", STORAGE_KEY, snapshot.version),
                    Ok(Err(e)) => tracing::error!("Failed to persist {}: {}", STORAGE_KEY, e),
                    Err(e) => tracing::error!("Layout write task aborted: {}", e),
                }
                done.send_replace(snapshot.version);
            }
            tracing::debug!("Layout writer stopped");
        });

        Arc::new(Self {
            inner,
            pending,
            written,
        })
    }

    /// Resolves once every snapshot handed over so far has been attempted
    pub async fn flush(&self) {
        let target = self.pending.borrow().version;
        let mut written = self.written.clone();
        if written.wait_for(|version| *version >= target).await.is_err() {
            tracing::warn!("Layout writer is gone, {} may be stale", STORAGE_KEY);
        }
    }
}

impl LayoutStorage for LayoutWriter {
    fn read(&self) -> Result<Option<String>, StorageError> {
        {
            let pending = self.pending.borrow();
            if pending.version > 0 {
                return Ok(Some(pending.contents.clone()));
            }
        }
        self.inner.read()
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        self.pending.send_modify(|snapshot| {
            snapshot.version += 1;
            snapshot.contents = contents.to_string();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::layout_service::TileLayoutManager;
    use crate::application::layout_storage::MemoryLayoutStorage;
    use crate::infrastructure::file_layout_storage::FileLayoutStorage;
    use std::time::Duration;

    struct FailingStorage;

    impl LayoutStorage for FailingStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _contents: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[tokio::test]
    async fn test_latest_write_reaches_inner_storage() {
        let inner = Arc::new(MemoryLayoutStorage::default());
        let writer = LayoutWriter::spawn(inner.clone());

        writer.write("[\"a\"]").unwrap();
        writer.write("[\"b\"]").unwrap();
        assert_eq!(writer.read().unwrap().as_deref(), Some("[\"b\"]"));

        tokio::time::timeout(Duration::from_secs(2), writer.flush())
            .await
            .unwrap();
        assert_eq!(inner.read().unwrap().as_deref(), Some("[\"b\"]"));
    }

    #[tokio::test]
    async fn test_reads_through_before_first_write() {
        let inner = Arc::new(MemoryLayoutStorage::with_contents("[]"));
        let writer = LayoutWriter::spawn(inner);
        assert_eq!(writer.read().unwrap().as_deref(), Some("[]"));

        tokio::time::timeout(Duration::from_secs(1), writer.flush())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_still_flushes() {
        let writer = LayoutWriter::spawn(Arc::new(FailingStorage));
        writer.write("[]").unwrap();

        tokio::time::timeout(Duration::from_secs(2), writer.flush())
            .await
            .unwrap();
        assert_eq!(writer.read().unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_layout_file_written_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard_tiles.json");
        let writer = LayoutWriter::spawn(Arc::new(FileLayoutStorage::new(&path)));

        let mut manager = TileLayoutManager::open(writer.clone());
        let added = manager.add();
        assert!(manager.remove("3"));
        let expected = manager.tiles().to_vec();

        tokio::time::timeout(Duration::from_secs(2), writer.flush())
            .await
            .unwrap();
        let reopened = TileLayoutManager::open(Arc::new(FileLayoutStorage::new(&path)));
        assert_eq!(reopened.tiles(), expected.as_slice());
        assert!(reopened.get(&added.id).is_some());
    }
}
