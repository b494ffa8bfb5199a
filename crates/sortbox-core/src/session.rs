//! Organize session: ties the sequencer, the settle queue and the file store
//! together and applies the status protocol.
//!
//! Progress events from the sequencer arrive over a channel and settle timers
//! fire from a [`SettleQueue`]; both are handled in one `select!` loop, so the
//! file list is only ever mutated from a single place. The list is persisted
//! after every change.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{AppConfig, PreviewConfig};
use crate::error::Result;
use crate::import::{PreviewBudget, build_record};
use crate::models::{Category, FileDescriptor};
use crate::sequencer::{OrganizeSummary, Organizer};
use crate::status::SettleQueue;
use crate::store::FileStore;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A batch was appended and is about to be organized.
    Started { count: usize },
    /// A record moved to `organizing` with its final category.
    Organizing { index: usize, name: String, category: Category },
    /// A record reached `organized`.
    Organized { index: usize, name: String },
    /// The batch is done; every reported record has settled.
    Finished { organized: usize, cancelled: bool },
}

/// Result of one [`Session::organize`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Index of the first appended record.
    pub first_index: usize,
    /// Records appended (descriptors that could not be read are skipped).
    pub added: usize,
    pub skipped: Vec<String>,
    pub summary: OrganizeSummary,
}

pub struct Session {
    store: FileStore,
    organizer: Organizer,
    settle_delay: Duration,
    preview: PreviewConfig,
}

struct Progress {
    index: usize,
    category: Category,
}

impl Session {
    pub fn new(store: FileStore, organizer: Organizer, settle_delay: Duration, preview: PreviewConfig) -> Self {
        Self {
            store,
            organizer,
            settle_delay,
            preview,
        }
    }

    pub fn from_config(store: FileStore, config: &AppConfig) -> Self {
        Self::new(
            store,
            Organizer::from_config(&config.organize),
            config.organize.settle_delay(),
            config.preview.clone(),
        )
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FileStore {
        &mut self.store
    }

    pub fn into_store(self) -> FileStore {
        self.store
    }

    /// Append `files` as pending records and organize them to completion.
    pub async fn organize<E>(&mut self, files: Vec<FileDescriptor>, on_event: E) -> Result<BatchReport>
    where
        E: FnMut(SessionEvent),
    {
        self.run(files, on_event, None).await
    }

    pub async fn organize_with_cancel<E>(
        &mut self,
        files: Vec<FileDescriptor>,
        on_event: E,
        cancel: &CancellationToken,
    ) -> Result<BatchReport>
    where
        E: FnMut(SessionEvent),
    {
        self.run(files, on_event, Some(cancel)).await
    }

    async fn run<E>(
        &mut self,
        files: Vec<FileDescriptor>,
        mut on_event: E,
        cancel: Option<&CancellationToken>,
    ) -> Result<BatchReport>
    where
        E: FnMut(SessionEvent),
    {
        let mut accepted = Vec::with_capacity(files.len());
        let mut records = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();
        let mut budget = PreviewBudget::new(&self.preview, self.store.records());
        for desc in files {
            match build_record(&desc, &self.preview, &mut budget) {
                Ok(record) => {
                    records.push(record);
                    accepted.push(desc);
                }
                Err(e) => {
                    warn!(name = %desc.name, "skipping unreadable file: {e}");
                    skipped.push(desc.name);
                }
            }
        }

        let first_index = self.store.append(records);
        self.store.save();
        on_event(SessionEvent::Started { count: accepted.len() });

        let Self {
            store,
            organizer,
            settle_delay,
            ..
        } = self;

        let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();
        let report = move |index: usize, category: Category| {
            let _ = tx.send(Progress { index, category });
        };
        let sequence = async {
            match cancel {
                Some(token) => organizer.organize_with_cancel(&accepted, report, token).await,
                None => organizer.organize(&accepted, report).await,
            }
        };
        tokio::pin!(sequence);

        let mut settle = SettleQueue::new(*settle_delay);
        let mut summary = None;
        let mut organized = 0;

        loop {
            tokio::select! {
                result = &mut sequence, if summary.is_none() => {
                    summary = Some(result?);
                }
                Some(Progress { index, category }) = rx.recv() => {
                    let target = first_index + index;
                    store.update(target, |r| r.mark_organizing(category))?;
                    store.save();
                    settle.schedule(target);
                    on_event(SessionEvent::Organizing {
                        index: target,
                        name: store.get(target)?.name.clone(),
                        category,
                    });
                }
                Some(target) = settle.next_due() => {
                    store.update(target, |r| r.mark_organized())?;
                    store.save();
                    organized += 1;
                    on_event(SessionEvent::Organized {
                        index: target,
                        name: store.get(target)?.name.clone(),
                    });
                }
                else => break,
            }
        }

        // the sequencer always resolves before both other branches go quiet
        let summary = summary.unwrap_or(OrganizeSummary {
            completed: 0,
            cancelled: false,
        });
        info!(
            added = accepted.len(),
            organized,
            cancelled = summary.cancelled,
            "batch finished"
        );
        on_event(SessionEvent::Finished {
            organized,
            cancelled: summary.cancelled,
        });

        Ok(BatchReport {
            first_index,
            added: accepted.len(),
            skipped,
            summary,
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("organizer", &self.organizer)
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}
