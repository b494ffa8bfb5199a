use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{STORAGE_KEY, SnapshotStore};
use crate::error::Result;
use crate::models::FileRecord;

/// Snapshot stored as `{dir}/file_organizer_files.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store whose snapshot lives in `dir` under the fixed key.
    pub fn in_dir(dir: &Path) -> Self {
        Self::at(dir.join(format!("{STORAGE_KEY}.json")))
    }

    /// Store backed by an explicit snapshot path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot through a temp file so readers never see half a document.
    pub fn try_persist(&self, records: &[FileRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn try_restore(&self) -> Result<Option<Vec<FileRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let records: Vec<FileRecord> = serde_json::from_str(&contents)?;
        Ok(Some(records))
    }

    pub fn try_clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn persist(&self, records: &[FileRecord]) {
        match self.try_persist(records) {
            Ok(()) => debug!(count = records.len(), path = %self.path.display(), "snapshot saved"),
            Err(e) => warn!(path = %self.path.display(), "Error saving files to storage: {e}"),
        }
    }

    fn restore(&self) -> Vec<FileRecord> {
        match self.try_restore() {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "Error loading files from storage: {e}");
                Vec::new()
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.try_clear() {
            warn!(path = %self.path.display(), "Error clearing files from storage: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, FileStatus};
    use tempfile::TempDir;

    fn sample_records() -> Vec<FileRecord> {
        let mut photo = FileRecord::new("photo.png", 2048, "image/png", Category::Images);
        photo.status = FileStatus::Organized;
        photo.preview_data = Some("data:image/png;base64,iVBORw==".to_string());

        let mut notes = FileRecord::new("notes.txt", 12, "text/plain", Category::Documents);
        notes.status = FileStatus::Organizing;
        notes.added_at = None;

        vec![photo, notes]
    }

    #[test]
    fn test_persist_and_restore_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        let records = sample_records();
        store.persist(&records);

        assert_eq!(store.restore(), records);
        assert!(store.path().ends_with("file_organizer_files.json"));
    }

    #[test]
    fn test_restore_without_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.restore().is_empty());
    }

    #[test]
    fn test_restore_after_clear_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        store.persist(&sample_records());
        store.clear();

        assert!(store.restore().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_snapshot_restores_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "[{\"name\": \"half").unwrap();

        assert!(store.restore().is_empty());
        assert!(store.try_restore().is_err());
    }

    #[test]
    fn test_unknown_category_restores_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        let json = r#"[
            {"name":"a.png","size":1,"type":"image/png","category":"images","status":"organized"},
            {"name":"b.bin","size":1,"type":"","category":"binaries","status":"organized"}
        ]"#;
        fs::write(store.path(), json).unwrap();

        assert!(store.restore().is_empty());
    }

    #[test]
    fn test_persist_overwrites_whole_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        store.persist(&sample_records());
        let single = vec![FileRecord::new("only.zip", 1, "application/zip", Category::Archives)];
        store.persist(&single);

        assert_eq!(store.restore(), single);
    }

    #[test]
    fn test_persist_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // parent is a regular file, so create_dir_all fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = JsonFileStore::at(blocker.join("snap.json"));

        store.persist(&sample_records());
        assert!(store.try_persist(&sample_records()).is_err());
        assert!(store.restore().is_empty());
    }
}
