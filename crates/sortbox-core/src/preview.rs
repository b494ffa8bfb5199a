use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, SortboxError};
use crate::models::FileRecord;

/// How a record can be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview<'a> {
    /// Renderable as-is; holds the `data:` URI.
    Inline(&'a str),
    /// Bytes are stored but only offered as a download.
    DownloadOnly,
    /// Nothing stored for this record.
    Unavailable,
}

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mime = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Length of the `data:` URI [`to_data_url`] produces for `size` bytes.
pub fn data_url_len(mime_type: &str, size: u64) -> u64 {
    let mime = if mime_type.is_empty() {
        "application/octet-stream".len()
    } else {
        mime_type.len()
    };
    ("data:;base64,".len() + mime) as u64 + size.div_ceil(3) * 4
}

/// Split a base64 `data:` URI into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| SortboxError::InvalidDataUrl("missing data: prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SortboxError::InvalidDataUrl("missing payload separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| SortboxError::InvalidDataUrl("only base64 payloads are supported".to_string()))?;

    let bytes = STANDARD.decode(payload)?;
    let mime = if mime.is_empty() {
        "text/plain".to_string()
    } else {
        mime.to_string()
    };
    Ok((mime, bytes))
}

pub fn preview_for(record: &FileRecord) -> Preview<'_> {
    match record.preview_data.as_deref() {
        None => Preview::Unavailable,
        Some(url) if record.category.supports_inline_preview() => Preview::Inline(url),
        Some(_) => Preview::DownloadOnly,
    }
}

/// Decoded bytes of a record's stored preview data.
pub fn record_bytes(record: &FileRecord) -> Result<Vec<u8>> {
    let url = record
        .preview_data
        .as_deref()
        .ok_or_else(|| SortboxError::NoPreviewData(record.name.clone()))?;
    let (_, bytes) = decode_data_url(url)?;
    Ok(bytes)
}
