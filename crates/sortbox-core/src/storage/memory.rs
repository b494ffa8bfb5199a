use std::sync::Mutex;

use tracing::warn;

use super::SnapshotStore;
use crate::models::FileRecord;

/// Snapshot held in process memory as the serialized JSON document.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, if any.
    pub fn raw(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SnapshotStore for MemoryStore {
    fn persist(&self, records: &[FileRecord]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                warn!("Error saving files to storage: {e}");
                return;
            }
        };
        match self.blob.lock() {
            Ok(mut guard) => *guard = Some(json),
            Err(e) => warn!("Error saving files to storage: {e}"),
        }
    }

    fn restore(&self) -> Vec<FileRecord> {
        let Some(json) = self.raw() else {
            return Vec::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Error loading files from storage: {e}");
            Vec::new()
        })
    }

    fn clear(&self) {
        match self.blob.lock() {
            Ok(mut guard) => *guard = None,
            Err(e) => warn!("Error clearing files from storage: {e}"),
        }
    }
}
