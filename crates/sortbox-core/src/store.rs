use tracing::info;

use crate::error::{Result, SortboxError};
use crate::models::{Category, FileRecord};
use crate::storage::SnapshotStore;

/// The current file list plus the backend it is mirrored to.
///
/// Construct with [`FileStore::open`], which restores the last snapshot.
/// Mutations only touch memory; call [`save`](Self::save) to persist.
pub struct FileStore {
    records: Vec<FileRecord>,
    backend: Box<dyn SnapshotStore>,
}

/// One category's slice of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub files: Vec<&'a FileRecord>,
}

impl CategoryGroup<'_> {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

impl FileStore {
    pub fn open(backend: impl SnapshotStore + 'static) -> Self {
        let mut store = Self {
            records: Vec::new(),
            backend: Box::new(backend),
        };
        store.load();
        store
    }

    /// Re-read the snapshot, replacing whatever is in memory.
    pub fn load(&mut self) {
        self.records = self.backend.restore();
        info!(count = self.records.len(), "file list loaded");
    }

    pub fn save(&self) {
        self.backend.persist(&self.records);
    }

    pub fn replace(&mut self, records: Vec<FileRecord>) {
        self.records = records;
    }

    /// Append records, returning the index of the first one.
    pub fn append(&mut self, records: impl IntoIterator<Item = FileRecord>) -> usize {
        let start = self.records.len();
        self.records.extend(records);
        start
    }

    /// Drop every record in memory and in the backend.
    pub fn clear(&mut self) {
        self.records.clear();
        self.backend.clear();
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&FileRecord> {
        self.records
            .get(index)
            .ok_or(SortboxError::RecordNotFound(index))
    }

    pub fn update<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut FileRecord),
    {
        let record = self
            .records
            .get_mut(index)
            .ok_or(SortboxError::RecordNotFound(index))?;
        f(record);
        Ok(())
    }

    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// Non-empty categories in display order, files in insertion order.
    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        Category::ALL
            .into_iter()
            .map(|category| CategoryGroup {
                category,
                files: self
                    .records
                    .iter()
                    .filter(|r| r.category == category)
                    .collect(),
            })
            .filter(|g| !g.files.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileStatus;
    use crate::storage::{JsonFileStore, MemoryStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(name: &str, size: u64, category: Category) -> FileRecord {
        FileRecord::new(name, size, "application/octet-stream", category)
    }

    #[test]
    fn test_open_restores_snapshot() {
        let backend = Arc::new(MemoryStore::new());
        let records = vec![record("a.png", 1, Category::Images)];
        backend.persist(&records);

        let store = FileStore::open(Arc::clone(&backend));
        assert_eq!(store.records(), records.as_slice());
    }

    #[test]
    fn test_append_and_save() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(JsonFileStore::in_dir(dir.path()));
        assert!(store.is_empty());

        let first = store.append(vec![record("a.png", 1, Category::Images)]);
        let second = store.append(vec![
            record("b.txt", 2, Category::Documents),
            record("c.mp4", 3, Category::Videos),
        ]);
        assert_eq!((first, second), (0, 1));
        store.save();

        let reopened = FileStore::open(JsonFileStore::in_dir(dir.path()));
        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.get(2).unwrap().name, "c.mp4");
    }

    #[test]
    fn test_unsaved_changes_are_not_persisted() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = FileStore::open(Arc::clone(&backend));
        store.append(vec![record("a.png", 1, Category::Images)]);
        assert!(backend.restore().is_empty());

        store.load();
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_and_missing_index() {
        let mut store = FileStore::open(MemoryStore::new());
        store.replace(vec![record("a.png", 1, Category::Other)]);

        store
            .update(0, |r| r.mark_organizing(Category::Images))
            .unwrap();
        assert_eq!(store.get(0).unwrap().status, FileStatus::Organizing);
        assert_eq!(store.get(0).unwrap().category, Category::Images);

        assert!(matches!(store.update(5, |_| {}), Err(SortboxError::RecordNotFound(5))));
        assert!(matches!(store.get(1), Err(SortboxError::RecordNotFound(1))));
    }

    #[test]
    fn test_grouped_in_display_order() {
        let mut store = FileStore::open(MemoryStore::new());
        store.replace(vec![
            record("z.zip", 5, Category::Archives),
            record("a.png", 1, Category::Images),
            record("b.jpg", 2, Category::Images),
            record("n", 7, Category::Other),
        ]);

        let groups = store.grouped();
        let cats: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(cats, vec![Category::Images, Category::Archives, Category::Other]);

        let images: Vec<_> = groups[0].files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(images, vec!["a.png", "b.jpg"]);
        assert_eq!(groups[0].total_size(), 3);
        assert_eq!(store.total_size(), 15);
    }

    #[test]
    fn test_clear_wipes_memory_and_backend() {
        let backend = Arc::new(MemoryStore::new());
        let mut store = FileStore::open(Arc::clone(&backend));
        store.append(vec![record("a.png", 1, Category::Images)]);
        store.save();

        store.clear();
        assert!(store.is_empty());
        assert!(backend.restore().is_empty());
    }
}
