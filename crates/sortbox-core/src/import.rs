use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::classifier::classify;
use crate::config::PreviewConfig;
use crate::error::{Result, SortboxError};
use crate::models::{FileContent, FileDescriptor, FileRecord};
use crate::preview::{data_url_len, to_data_url};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Describe a file on disk: name, size from metadata, MIME guessed from the extension.
pub fn describe_file(path: &Path) -> Result<FileDescriptor> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(SortboxError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a regular file: {}", path.display()),
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME)
        .to_string();

    Ok(FileDescriptor {
        name,
        size: metadata.len(),
        mime_type,
        content: FileContent::Path(path.to_path_buf()),
    })
}

/// Expand `paths` into descriptors. Directories contribute their files
/// (hidden entries skipped, sorted by name); unreadable entries are logged and skipped.
pub fn collect_files(paths: &[PathBuf], recursive: bool) -> Vec<FileDescriptor> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            scan_directory(path, recursive, &mut files);
        } else {
            match describe_file(path) {
                Ok(desc) => files.push(desc),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
    }
    files
}

fn scan_directory(dir: &Path, recursive: bool, out: &mut Vec<FileDescriptor>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("skipping directory {}: {e}", dir.display());
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| !is_hidden(p))
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if recursive {
                scan_directory(&path, true, out);
            }
        } else {
            match describe_file(&path) {
                Ok(desc) => out.push(desc),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

/// Room left for embedded preview data in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBudget {
    remaining: u64,
}

impl PreviewBudget {
    /// Budget after the preview data already held by `existing`.
    pub fn new(preview: &PreviewConfig, existing: &[FileRecord]) -> Self {
        let used: u64 = existing
            .iter()
            .filter_map(|r| r.preview_data.as_ref())
            .map(|url| url.len() as u64)
            .sum();
        Self {
            remaining: preview.max_snapshot_bytes.saturating_sub(used),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn try_take(&mut self, bytes: u64) -> bool {
        if bytes > self.remaining {
            return false;
        }
        self.remaining -= bytes;
        true
    }
}

/// Build the pending record for a descriptor, with its category pre-classified
/// and its bytes embedded as a `data:` URI when previews are enabled, the
/// file is within the size limit and `budget` still has room for it.
pub fn build_record(
    desc: &FileDescriptor,
    preview: &PreviewConfig,
    budget: &mut PreviewBudget,
) -> Result<FileRecord> {
    let mut record = FileRecord::new(
        desc.name.clone(),
        desc.size,
        desc.mime_type.clone(),
        classify(&desc.name),
    );

    if !preview.embed_previews || desc.size > preview.max_preview_bytes {
        debug!(name = %desc.name, size = desc.size, "preview data not embedded");
        return Ok(record);
    }

    let bytes = desc.read_content()?;
    let url_len = data_url_len(&desc.mime_type, bytes.len() as u64);
    if budget.try_take(url_len) {
        record.preview_data = Some(to_data_url(&desc.mime_type, &bytes));
    } else {
        warn!(
            name = %desc.name,
            remaining = budget.remaining(),
            "snapshot preview budget exhausted, storing without preview data"
        );
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, FileStatus};
    use crate::preview::decode_data_url;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_describe_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Holiday.JPG");
        fs::write(&path, [0u8; 42]).unwrap();

        let desc = describe_file(&path).unwrap();
        assert_eq!(desc.name, "Holiday.JPG");
        assert_eq!(desc.size, 42);
        assert_eq!(desc.mime_type, "image/jpeg");
        assert_eq!(desc.content, FileContent::Path(path));
    }

    #[test]
    fn test_describe_unknown_extension_uses_fallback_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.zzzunknown");
        File::create(&path).unwrap();

        assert_eq!(describe_file(&path).unwrap().mime_type, FALLBACK_MIME);
    }

    #[test]
    fn test_describe_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(describe_file(dir.path()).is_err());
    }

    #[test]
    fn test_collect_files_flat() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("b.pdf")).unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("c.mp3")).unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], false);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.pdf"]);
    }

    #[test]
    fn test_collect_files_recursive_and_missing() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("c.mp3")).unwrap();
        let missing = dir.path().join("missing.txt");

        let files = collect_files(&[dir.path().to_path_buf(), missing], true);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.mp3"]);
    }

    #[test]
    fn test_build_record_embeds_preview() {
        let desc = FileDescriptor::from_bytes("photo.png", "image/png", b"pixels".to_vec());
        let preview = PreviewConfig::default();
        let mut budget = PreviewBudget::new(&preview, &[]);
        let record = build_record(&desc, &preview, &mut budget).unwrap();

        assert_eq!(record.category, Category::Images);
        assert_eq!(record.status, FileStatus::Pending);
        assert_eq!(record.size, 6);
        let (mime, bytes) = decode_data_url(record.preview_data.as_deref().unwrap()).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"pixels");
    }

    #[test]
    fn test_build_record_respects_limits() {
        let desc = FileDescriptor::from_bytes("big.zip", "application/zip", vec![0; 16]);

        let small_limit = PreviewConfig { max_preview_bytes: 8, ..PreviewConfig::default() };
        let mut budget = PreviewBudget::new(&small_limit, &[]);
        assert!(build_record(&desc, &small_limit, &mut budget).unwrap().preview_data.is_none());

        let disabled = PreviewConfig { embed_previews: false, ..PreviewConfig::default() };
        let mut budget = PreviewBudget::new(&disabled, &[]);
        assert!(build_record(&desc, &disabled, &mut budget).unwrap().preview_data.is_none());
    }

    #[test]
    fn test_build_record_stops_embedding_when_budget_runs_out() {
        let one = FileDescriptor::from_bytes("a.png", "image/png", vec![7; 30]);
        let url_len = data_url_len("image/png", 30);
        let preview = PreviewConfig { max_snapshot_bytes: url_len * 2, ..PreviewConfig::default() };
        let mut budget = PreviewBudget::new(&preview, &[]);

        let first = build_record(&one, &preview, &mut budget).unwrap();
        let second = build_record(&one, &preview, &mut budget).unwrap();
        let third = build_record(&one, &preview, &mut budget).unwrap();

        assert!(first.preview_data.is_some());
        assert!(second.preview_data.is_some());
        assert!(third.preview_data.is_none());
        assert_eq!(third.category, Category::Images);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_accounts_for_existing_records() {
        let desc = FileDescriptor::from_bytes("a.png", "image/png", vec![7; 30]);
        let preview = PreviewConfig::default();
        let mut fresh = PreviewBudget::new(&preview, &[]);
        let existing = vec![build_record(&desc, &preview, &mut fresh).unwrap()];

        let budget = PreviewBudget::new(&preview, &existing);
        assert_eq!(
            budget.remaining(),
            preview.max_snapshot_bytes - data_url_len("image/png", 30)
        );
    }

    #[test]
    fn test_build_record_unreadable_file_errors() {
        let desc = FileDescriptor {
            name: "gone.txt".to_string(),
            size: 1,
            mime_type: "text/plain".to_string(),
            content: FileContent::Path(PathBuf::from("/tmp/nonexistent_sortbox_import.txt")),
        };
        let preview = PreviewConfig::default();
        let mut budget = PreviewBudget::new(&preview, &[]);
        assert!(build_record(&desc, &preview, &mut budget).is_err());
    }
}
