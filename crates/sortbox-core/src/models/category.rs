use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SortboxError;

/// Bucket a file is sorted into.
///
/// Variant order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Images,
    Pdfs,
    Documents,
    Videos,
    Audio,
    Archives,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Images,
        Self::Pdfs,
        Self::Documents,
        Self::Videos,
        Self::Audio,
        Self::Archives,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Pdfs => "pdfs",
            Self::Documents => "documents",
            Self::Videos => "videos",
            Self::Audio => "audio",
            Self::Archives => "archives",
            Self::Other => "other",
        }
    }

    /// Folder heading shown in grouped views.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Pdfs => "PDFs",
            Self::Documents => "Documents",
            Self::Videos => "Videos",
            Self::Audio => "Audio",
            Self::Archives => "Archives",
            Self::Other => "Other Files",
        }
    }

    /// Virtual folder path, e.g. `/images`.
    pub fn folder_path(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Whether stored preview data can be rendered inline.
    /// Everything else is download-only.
    pub fn supports_inline_preview(&self) -> bool {
        matches!(self, Self::Images | Self::Pdfs)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = SortboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SortboxError::UnknownCategory(s.to_string()))
    }
}
