use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SortboxError};
use crate::models::FileRecord;
use crate::preview::{Preview, decode_data_url, preview_for, record_bytes};

/// Write a record's stored bytes to `dest`. An existing file is only
/// replaced when `overwrite` is set.
pub fn download(record: &FileRecord, dest: &Path, overwrite: bool) -> Result<PathBuf> {
    let bytes = record_bytes(record)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options.open(dest).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => SortboxError::DestinationExists(dest.display().to_string()),
        _ => SortboxError::Io(e),
    })?;
    file.write_all(&bytes)?;
    Ok(dest.to_path_buf())
}

/// Default download target: the record's name, reduced to a single path
/// component, inside `dir`.
pub fn default_download_path(record: &FileRecord, dir: &Path) -> PathBuf {
    dir.join(safe_file_name(&record.name))
}

/// Materialize an inline-previewable record under `cache_dir`.
/// Download-only categories are refused.
pub fn write_preview(record: &FileRecord, cache_dir: &Path) -> Result<PathBuf> {
    let url = match preview_for(record) {
        Preview::Inline(url) => url,
        Preview::DownloadOnly => {
            return Err(SortboxError::NoPreviewData(format!(
                "{} ({} files are download-only)",
                record.name, record.category
            )));
        }
        Preview::Unavailable => return Err(SortboxError::NoPreviewData(record.name.clone())),
    };

    let (_, bytes) = decode_data_url(url)?;
    fs::create_dir_all(cache_dir)?;
    let path = cache_dir.join(safe_file_name(&record.name));
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Open a record's preview in the system viewer.
pub fn open_preview(record: &FileRecord, cache_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = write_preview(record, cache_dir)?;
    open::that(&path)?;
    Ok(path)
}

fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "preview".to_string()
    } else {
        cleaned
    }
}
