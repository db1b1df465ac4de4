//! File-based archive store: one pretty-printed JSON document.
//!
//! The whole archive is rewritten on every save: serialized to
//! `<file>.tmp`, synced, then renamed over the target so a crash never
//! leaves a half-written archive behind.
//!
//! Storage location: `~/.mathdesk/student_archives.json` by default.
//! The file stays human-readable: 4-space indentation and non-ASCII
//! text written as-is, so it diffs cleanly.

use async_trait::async_trait;
use mathdesk_core::archive::Archive;
use mathdesk_core::error::StoreError;
use mathdesk_core::store::ArchiveStore;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What `load` does with a file that exists but is not a valid archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Return `StoreError::Corrupt` and leave the file alone.
    #[default]
    Fail,
    /// Rename the file to `<file>.corrupt-<unix-millis>` (suffixed `-N` if taken) and start empty.
    Quarantine,
}

/// A JSON-file-backed archive store.
pub struct JsonFileStore {
    path: PathBuf,
    on_corrupt: CorruptPolicy,
}

impl JsonFileStore {
    /// Create a store for the given path. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            on_corrupt: CorruptPolicy::default(),
        }
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for the write-then-rename step.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "student_archives.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn quarantine(&self, reason: &str) -> Result<Archive, StoreError> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let target = (0u32..)
            .map(|n| {
                let mut name = self.path.as_os_str().to_os_string();
                match n {
                    0 => name.push(format!(".corrupt-{stamp}")),
                    _ => name.push(format!(".corrupt-{stamp}-{n}")),
                }
                PathBuf::from(name)
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or_else(|| self.temp_path());

        fs::rename(&self.path, &target).map_err(|e| StoreError::Write {
            path: target.clone(),
            reason: format!("failed to quarantine corrupt archive: {e}"),
        })?;

        warn!(
            path = %self.path.display(),
            moved_to = %target.display(),
            reason,
            "Corrupt archive quarantined; starting empty"
        );
        Ok(Archive::new())
    }

    fn encode(archive: &Archive) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        archive.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

#[async_trait]
impl ArchiveStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn load(&self) -> Result<Archive, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No archive yet; starting empty");
                return Ok(Archive::new());
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Archive::new());
        }

        match serde_json::from_str::<Archive>(&content) {
            Ok(archive) => {
                debug!(
                    path = %self.path.display(),
                    students = archive.len(),
                    records = archive.record_count(),
                    "Archive loaded"
                );
                Ok(archive)
            }
            Err(e) => match self.on_corrupt {
                CorruptPolicy::Fail => Err(StoreError::Corrupt {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }),
                CorruptPolicy::Quarantine => self.quarantine(&e.to_string()),
            },
        }
    }

    async fn save(&self, archive: &Archive) -> Result<(), StoreError> {
        let write_err = |reason: String| StoreError::Write {
            path: self.path.clone(),
            reason,
        };

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| write_err(format!("failed to create archive directory: {e}")))?;
        }

        let bytes = Self::encode(archive)
            .map_err(|e| write_err(format!("failed to serialize archive: {e}")))?;

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path)
            .map_err(|e| write_err(format!("failed to create {}: {e}", tmp_path.display())))?;
        tmp_file
            .write_all(&bytes)
            .and_then(|_| tmp_file.sync_all())
            .map_err(|e| write_err(e.to_string()))?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            write_err(format!("failed to replace archive: {e}"))
        })?;

        debug!(
            path = %self.path.display(),
            students = archive.len(),
            bytes = bytes.len(),
            "Archive saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathdesk_core::record::{Record, RecordKind};
    use mathdesk_core::message::Role;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("student_archives.json"))
    }

    fn sample() -> Archive {
        let mut archive = Archive::new();
        archive.create_student("Alice").unwrap();
        archive.create_student("王小明").unwrap();
        archive
            .append_records(
                "王小明",
                [
                    Record::user("解方程 2x+3=7，学生得 x=5"),
                    Record::assistant("移项时符号错误，x=2"),
                    Record::image_analysis("拍照错题分析", "函数图像平移方向弄反"),
                ],
            )
            .unwrap();
        archive
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let archive = store_in(&dir).load().await.unwrap();
        assert!(archive.is_empty());
    }

    #[tokio::test]
    async fn save_load_roundtrip_preserves_everything() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let original = sample();

        store.save(&original).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, original);

        // A second save of the reloaded archive is byte-identical.
        let first = fs::read(store.path()).unwrap();
        store.save(&loaded).await.unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), first);
    }

    #[tokio::test]
    async fn file_is_indented_and_keeps_chinese_text() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).await.unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("王小明"));
        assert!(text.contains("移项时符号错误"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\n    \"Alice\": []"));
    }

    #[tokio::test]
    async fn save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).await.unwrap();

        let mut smaller = Archive::new();
        smaller.create_student("Bob").unwrap();
        store.save(&smaller).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, smaller);
        assert!(!dir.path().join("student_archives.json.tmp").exists());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/archive.json"));
        store.save(&sample()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn legacy_files_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{
    "Alice": [
        {"role": "user", "content": "2+2=5, 错在哪?"},
        {"role": "assistant", "content": "加法错误"}
    ],
    "Bob": [
        {"time": "2024-11-02 19:30", "type": "拍照错题", "content": "审题不清"}
    ]
}"#,
        )
        .unwrap();

        let archive = store.load().await.unwrap();
        let alice = archive.history("Alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].role, Some(Role::User));
        assert_eq!(alice[1].content, "加法错误");
        assert_eq!(archive.history("Bob").unwrap()[0].kind, RecordKind::ImageAnalysis);
    }

    #[tokio::test]
    async fn empty_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_surfaced_by_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // Left untouched for the teacher to inspect.
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn wrong_shape_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"Alice": "not a list"}"#).unwrap();
        assert!(matches!(store.load().await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn corrupt_file_can_be_quarantined() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).with_corrupt_policy(CorruptPolicy::Quarantine);
        fs::write(store.path(), "[1, 2, 3]").unwrap();

        let archive = store.load().await.unwrap();
        assert!(archive.is_empty());
        assert!(!store.path().exists());

        let moved: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(fs::read_to_string(moved[0].path()).unwrap(), "[1, 2, 3]");
    }

    #[tokio::test]
    async fn repeated_quarantines_keep_every_copy() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).with_corrupt_policy(CorruptPolicy::Quarantine);

        for body in ["first", "second", "third"] {
            fs::write(store.path(), body).unwrap();
            assert!(store.load().await.unwrap().is_empty());
        }

        let mut kept: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .map(|e| fs::read_to_string(e.path()).unwrap())
            .collect();
        kept.sort();
        assert_eq!(kept, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn unwritable_location_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = JsonFileStore::new(blocker.join("archive.json"));

        let err = store.save(&sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
