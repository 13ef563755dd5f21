//! The single-job state slot and identity-guarded mutation
//!
//! The job record is the only mutable state shared between the worker and
//! the caller. It lives behind a std mutex with short, await-free critical
//! sections. Every mutation helper takes the [`JobId`] the update belongs
//! to and becomes a no-op when it no longer matches the current job — a
//! stale update from a superseded worker must never touch a newer job.

use crate::archive;
use crate::types::{
    Bundle, CompletedItem, FailedItem, JobEvent, JobId, JobSnapshot, MediaFormat, StatusLevel,
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::PlaylistDownloader;

/// The mutable record of one download job
pub(crate) struct Job {
    pub(crate) id: JobId,
    pub(crate) source_url: String,
    pub(crate) format: MediaFormat,
    pub(crate) item_cap: Option<usize>,
    pub(crate) running: bool,
    pub(crate) playlist_title: Option<String>,
    pub(crate) total_items: Option<usize>,
    pub(crate) items: Vec<Arc<CompletedItem>>,
    pub(crate) failures: Vec<FailedItem>,
    pub(crate) archive: Option<Arc<Bundle>>,
    pub(crate) status: StatusLevel,
    pub(crate) status_message: String,
    pub(crate) progress: f32,
    pub(crate) progress_text: String,
    pub(crate) cancel: CancellationToken,
    pub(crate) terminal_error: Option<String>,
    pub(crate) started_at: DateTime<Utc>,
}

impl Job {
    pub(crate) fn new(
        id: JobId,
        source_url: String,
        format: MediaFormat,
        item_cap: Option<usize>,
        cancel: CancellationToken,
        status_message: String,
    ) -> Self {
        Self {
            id,
            source_url,
            format,
            item_cap,
            running: true,
            playlist_title: None,
            total_items: None,
            items: Vec::new(),
            failures: Vec::new(),
            archive: None,
            status: StatusLevel::Info,
            progress: 0.0,
            progress_text: status_message.clone(),
            status_message,
            cancel,
            terminal_error: None,
            started_at: Utc::now(),
        }
    }

    pub(crate) fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            source_url: self.source_url.clone(),
            format: self.format,
            item_cap: self.item_cap,
            running: self.running,
            playlist_title: self.playlist_title.clone(),
            total_items: self.total_items,
            items: self.items.clone(),
            failures: self.failures.clone(),
            archive: self.archive.clone(),
            status: self.status,
            status_message: self.status_message.clone(),
            progress: self.progress,
            progress_text: self.progress_text.clone(),
            cancel_requested: self.cancel.is_cancelled(),
            terminal_error: self.terminal_error.clone(),
            started_at: self.started_at,
        }
    }
}

/// Holder for the at-most-one current job
#[derive(Default)]
pub(crate) struct JobSlot {
    current: Mutex<Option<Job>>,
}

impl JobSlot {
    /// Lock the slot, recovering from a poisoned mutex.
    ///
    /// A worker that panicked mid-update leaves consistent-enough state for
    /// reads (append-only vectors, scalar fields); refusing all further
    /// access would be strictly worse.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<Job>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaylistDownloader {
    /// Broadcast an event; a send error only means nobody is subscribed.
    pub(crate) fn emit(&self, event: JobEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Run `mutate` against the current job iff its identity matches `id`.
    fn with_job<R>(&self, id: JobId, mutate: impl FnOnce(&mut Job) -> R) -> Option<R> {
        let mut slot = self.job.lock();
        match slot.as_mut() {
            Some(job) if job.id == id => Some(mutate(job)),
            _ => None,
        }
    }

    /// Set the aggregate status (identity-guarded)
    pub(crate) fn update_status(
        &self,
        id: JobId,
        level: StatusLevel,
        message: impl Into<String>,
    ) {
        let message = message.into();
        let applied = self.with_job(id, |job| {
            job.status = level;
            job.status_message = message.clone();
        });
        if applied.is_some() {
            self.emit(JobEvent::Status { id, level, message });
        }
    }

    /// Set the progress fraction and text (identity-guarded, clamped)
    pub(crate) fn update_progress(&self, id: JobId, fraction: f32, text: impl Into<String>) {
        let fraction = fraction.clamp(0.0, 1.0);
        let text = text.into();
        let applied = self.with_job(id, |job| {
            job.progress = fraction;
            job.progress_text = text.clone();
        });
        if applied.is_some() {
            self.emit(JobEvent::Progress { id, fraction, text });
        }
    }

    /// Record resolution results: playlist title and total entry count.
    ///
    /// Emits `TotalKnown` — always before any per-item event.
    pub(crate) fn set_resolved(&self, id: JobId, title: Option<String>, total: usize) {
        let applied = self.with_job(id, |job| {
            job.playlist_title = title;
            job.total_items = Some(total);
        });
        if applied.is_some() {
            self.emit(JobEvent::TotalKnown { id, count: total });
        }
    }

    /// Append a completed item (identity-guarded)
    pub(crate) fn push_item(&self, id: JobId, item: Arc<CompletedItem>) {
        let applied = self.with_job(id, |job| {
            job.items.push(item.clone());
        });
        if applied.is_some() {
            self.emit(JobEvent::ItemSucceeded { id, item });
        }
    }

    /// Append a failed item (identity-guarded)
    pub(crate) fn push_failure(&self, id: JobId, failure: FailedItem) {
        let title = failure.title.clone();
        let error = failure.error.clone();
        let applied = self.with_job(id, |job| {
            job.failures.push(failure);
        });
        if applied.is_some() {
            self.emit(JobEvent::ItemFailed { id, title, error });
        }
    }

    /// Abort the job with a terminal error.
    ///
    /// Writes every terminal field before clearing `running`, so
    /// `running == false` remains the "final state is readable" signal.
    pub(crate) fn fail_job(&self, id: JobId, message: String) {
        let applied = self.with_job(id, |job| {
            job.terminal_error = Some(message.clone());
            job.status = StatusLevel::Error;
            job.status_message = message.clone();
            job.running = false;
        });
        if applied.is_some() {
            self.emit(JobEvent::Status {
                id,
                level: StatusLevel::Error,
                message,
            });
            self.emit(JobEvent::Finished { id });
        }
    }

    /// Finalize a run that made it past resolution: bundle completed items
    /// and write the terminal status.
    ///
    /// Bundling happens outside the lock (payloads can be large); items are
    /// shared `Arc`s, so the clone taken for bundling is cheap.
    pub(crate) fn finalize_job(&self, id: JobId) {
        let Some((items, failure_count, title, format, cancelled, total)) =
            self.with_job(id, |job| {
                (
                    job.items.clone(),
                    job.failures.len(),
                    job.playlist_title.clone(),
                    job.format,
                    job.cancel.is_cancelled(),
                    job.total_items,
                )
            })
        else {
            return;
        };

        let bundle = if items.is_empty() {
            None
        } else {
            let name = archive::archive_name(title.as_deref(), format);
            match archive::build_bundle(name, &items) {
                Ok(bundle) => Some(Arc::new(bundle)),
                Err(err) => {
                    warn!(job_id = %id, error = %err, "failed to build bundle");
                    None
                }
            }
        };

        let processed = items.len() + failure_count;
        let (level, status_message, progress, progress_text) = if cancelled {
            let denominator = total.unwrap_or(processed).max(1);
            (
                StatusLevel::Warning,
                "Download cancelled.".to_string(),
                (processed as f32 / denominator as f32).min(1.0),
                "Download cancelled.".to_string(),
            )
        } else {
            let source = title.unwrap_or_else(|| "the playlist".to_string());
            (
                StatusLevel::Success,
                format!(
                    "Completed {} of {} items from {}.",
                    items.len(),
                    processed,
                    source
                ),
                1.0,
                "Downloads complete!".to_string(),
            )
        };

        let applied = self.with_job(id, |job| {
            job.archive = bundle;
            job.status = level;
            job.status_message = status_message.clone();
            job.progress = progress;
            job.progress_text = progress_text.clone();
            // Last write: readers seeing running == false see final state
            job.running = false;
        });
        if applied.is_some() {
            self.emit(JobEvent::Status {
                id,
                level,
                message: status_message,
            });
            self.emit(JobEvent::Progress {
                id,
                fraction: progress,
                text: progress_text,
            });
            self.emit(JobEvent::Finished { id });
        }
    }
}
