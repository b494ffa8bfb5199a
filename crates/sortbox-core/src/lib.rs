pub mod classifier;
pub mod config;
pub mod error;
pub mod format;
pub mod import;
pub mod models;
pub mod preview;
pub mod sequencer;
pub mod session;
pub mod status;
pub mod storage;
pub mod store;
pub mod viewer;

pub use classifier::{classify, extensions_for, file_extension};
pub use config::{AppConfig, OrganizeConfig, PreviewConfig, StorageConfig};
pub use error::{ExitCode, Result, SortboxError};
pub use models::*;

pub use format::format_size;
pub use preview::{Preview, preview_for};
pub use sequencer::{DelayRange, OrganizeSummary, Organizer};
pub use session::{BatchReport, Session, SessionEvent};
pub use status::SettleQueue;
pub use storage::{JsonFileStore, MemoryStore, STORAGE_KEY, SnapshotStore};
pub use store::{CategoryGroup, FileStore};
