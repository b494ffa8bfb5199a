use std::path::PathBuf;

use crate::error::Result;

/// Where a descriptor's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file handed to the organizer: its name, size and type plus a way to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub content: FileContent,
}

impl FileDescriptor {
    /// In-memory descriptor; size is taken from the buffer.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            content: FileContent::Bytes(bytes),
        }
    }

    pub fn read_content(&self) -> Result<Vec<u8>> {
        match &self.content {
            FileContent::Path(path) => Ok(std::fs::read(path)?),
            FileContent::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}
