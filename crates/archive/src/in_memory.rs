//! In-memory store: useful for testing and dry runs.

use async_trait::async_trait;
use mathdesk_core::archive::Archive;
use mathdesk_core::error::StoreError;
use mathdesk_core::store::ArchiveStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// An archive store that keeps the last saved archive in memory.
///
/// Saves can be made to fail on demand, which lets callers exercise
/// their persistence-failure paths without touching the filesystem.
pub struct InMemoryStore {
    archive: Arc<RwLock<Archive>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_archive(Archive::new())
    }

    /// Start from an already-populated archive.
    pub fn with_archive(archive: Archive) -> Self {
        Self {
            archive: Arc::new(RwLock::new(archive)),
            fail_saves: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The archive as last saved.
    pub async fn snapshot(&self) -> Archive {
        self.archive.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn load(&self) -> Result<Archive, StoreError> {
        Ok(self.archive.read().await.clone())
    }

    async fn save(&self, archive: &Archive) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                path: PathBuf::from(":memory:"),
                reason: "saves disabled".into(),
            });
        }
        *self.archive.write().await = archive.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathdesk_core::record::Record;

    #[tokio::test]
    async fn save_then_load() {
        let store = InMemoryStore::new();
        let mut archive = Archive::new();
        archive.create_student("Alice").unwrap();
        archive.append_records("Alice", [Record::user("q")]).unwrap();

        store.save(&archive).await.unwrap();
        assert_eq!(store.load().await.unwrap(), archive);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn failing_saves_keep_previous_state() {
        let mut seeded = Archive::new();
        seeded.create_student("Bob").unwrap();
        let store = InMemoryStore::with_archive(seeded.clone());
        store.set_fail_saves(true);

        let err = store.save(&Archive::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.snapshot().await, seeded);
        assert_eq!(store.save_count(), 0);
    }
}
