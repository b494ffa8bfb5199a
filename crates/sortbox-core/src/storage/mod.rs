//! Whole-list snapshot persistence.
//!
//! The file list is stored as one opaque JSON document under a single fixed
//! key. Every operation is best-effort: failures are logged and swallowed so
//! the in-memory list stays the source of truth for the session.

pub mod json_snapshot;
pub mod memory;

pub use json_snapshot::JsonFileStore;
pub use memory::MemoryStore;

use crate::models::FileRecord;

/// Key the snapshot lives under.
pub const STORAGE_KEY: &str = "file_organizer_files";

/// Backend that can hold one snapshot of the file list.
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot with `records`.
    fn persist(&self, records: &[FileRecord]);

    /// Stored snapshot, or an empty list when there is none or it can't be read.
    fn restore(&self) -> Vec<FileRecord>;

    /// Remove the stored snapshot.
    fn clear(&self);
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn persist(&self, records: &[FileRecord]) {
        (**self).persist(records)
    }

    fn restore(&self) -> Vec<FileRecord> {
        (**self).restore()
    }

    fn clear(&self) {
        (**self).clear()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn persist(&self, records: &[FileRecord]) {
        (**self).persist(records)
    }

    fn restore(&self) -> Vec<FileRecord> {
        (**self).restore()
    }

    fn clear(&self) {
        (**self).clear()
    }
}
