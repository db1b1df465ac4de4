//! ArchiveStore trait: where the Archive lives between runs.
//!
//! A store always reads and writes the *whole* archive: `save` replaces
//! whatever was there before. There is no locking; with two writers the
//! last save wins.

use crate::archive::Archive;
use crate::error::StoreError;
use async_trait::async_trait;

/// The core ArchiveStore trait.
///
/// Implementations: JSON file (production), in-memory (tests, dry runs).
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// The backend name (e.g., "json-file", "in-memory").
    fn name(&self) -> &str;

    /// Read the archive. A store with nothing saved yet yields an empty archive.
    async fn load(&self) -> std::result::Result<Archive, StoreError>;

    /// Replace the stored archive with `archive`.
    async fn save(&self, archive: &Archive) -> std::result::Result<(), StoreError>;
}
