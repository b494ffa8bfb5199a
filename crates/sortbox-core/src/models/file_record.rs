use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// Progress of a single file through an organize run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Pending,
    Organizing,
    Organized,
}

impl FileStatus {
    /// Next status in the linear `pending -> organizing -> organized` chain.
    /// `Organized` is terminal.
    pub fn advance(self) -> Self {
        match self {
            Self::Pending => Self::Organizing,
            Self::Organizing | Self::Organized => Self::Organized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Organizing => "organizing",
            Self::Organized => "organized",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the file list. This is the unit persisted in snapshots,
/// so field names keep the snapshot's camelCase layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub size: u64,

    #[serde(rename = "type")]
    pub mime_type: String,

    pub category: Category,
    pub status: FileStatus,

    /// `data:` URI holding the file's bytes.
    #[serde(rename = "dataUrl", default, skip_serializing_if = "Option::is_none")]
    pub preview_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            category,
            status: FileStatus::Pending,
            preview_data: None,
            added_at: Some(Utc::now()),
        }
    }

    pub fn is_organized(&self) -> bool {
        self.status == FileStatus::Organized
    }

    /// Pending -> Organizing, attaching the category reported by the sequencer.
    pub fn mark_organizing(&mut self, category: Category) {
        if self.status == FileStatus::Pending {
            self.status = self.status.advance();
        }
        self.category = category;
    }

    /// Organizing -> Organized. A pending record is not skipped ahead.
    pub fn mark_organized(&mut self) {
        if self.status == FileStatus::Organizing {
            self.status = self.status.advance();
        }
    }
}
