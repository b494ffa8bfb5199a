//! Simulated, one-at-a-time organize run.
//!
//! Files are classified in order; each one waits a random delay before its
//! category is reported, so callers get a staggered reveal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::classifier::classify;
use crate::config::OrganizeConfig;
use crate::error::{Result, SortboxError};
use crate::models::{Category, FileDescriptor};

/// Outcome of a finished organize run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizeSummary {
    /// Number of files whose progress callback fired.
    pub completed: usize,
    pub cancelled: bool,
}

/// Uniform delay range `[min, max)`. `min == max` is a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let mut rng = rand::rng();
        rng.random_range(self.min..self.max)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(1000))
    }
}

/// Drives file descriptors through the simulated organize sequence.
///
/// Only one run may be active per organizer; a concurrent call is rejected
/// with [`SortboxError::AlreadyOrganizing`].
#[derive(Debug, Default)]
pub struct Organizer {
    delay: DelayRange,
    running: AtomicBool,
}

/// Clears the running flag when a run ends, including on cancellation or drop.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Organizer {
    pub fn new(delay: DelayRange) -> Self {
        Self {
            delay,
            running: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &OrganizeConfig) -> Self {
        Self::new(DelayRange::new(config.min_delay(), config.max_delay()))
    }

    pub fn delay(&self) -> DelayRange {
        self.delay
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run to completion, reporting `(index, category)` for each file in order.
    pub async fn organize<F>(&self, files: &[FileDescriptor], on_progress: F) -> Result<OrganizeSummary>
    where
        F: FnMut(usize, Category),
    {
        self.run(files, on_progress, None).await
    }

    /// Like [`organize`](Self::organize) but stops before the next report once
    /// `cancel` fires.
    pub async fn organize_with_cancel<F>(
        &self,
        files: &[FileDescriptor],
        on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<OrganizeSummary>
    where
        F: FnMut(usize, Category),
    {
        self.run(files, on_progress, Some(cancel)).await
    }

    async fn run<F>(
        &self,
        files: &[FileDescriptor],
        mut on_progress: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<OrganizeSummary>
    where
        F: FnMut(usize, Category),
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SortboxError::AlreadyOrganizing);
        }
        let _guard = RunGuard(&self.running);

        info!(count = files.len(), "organizing files");
        let mut completed = 0;

        for (index, file) in files.iter().enumerate() {
            let category = classify(&file.name);
            let delay = self.delay.sample();

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = token.cancelled() => {
                            info!(completed, "organize run cancelled");
                            return Ok(OrganizeSummary { completed, cancelled: true });
                        }
                    }
                }
                None => tokio::time::sleep(delay).await,
            }

            debug!(index, name = %file.name, %category, "file categorized");
            on_progress(index, category);
            completed += 1;
        }

        Ok(OrganizeSummary {
            completed,
            cancelled: false,
        })
    }
}
