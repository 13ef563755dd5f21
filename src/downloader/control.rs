//! Job admission and lifecycle control — start, cancel, snapshots, events.

use crate::error::{Error, Result};
use crate::types::{JobEvent, JobId, JobSnapshot, MediaFormat, StatusLevel};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::PlaylistDownloader;
use super::state::Job;

impl PlaylistDownloader {
    /// Start a download job for `url`, producing `format` output.
    ///
    /// `item_cap` limits processing to the first N playlist entries. When
    /// no cap is given and the URL looks like an auto-generated mix
    /// playlist, the configured mix cap is applied instead.
    ///
    /// The job runs on a spawned worker task; this method returns the job
    /// id immediately. Observe the run via [`subscribe`](Self::subscribe)
    /// or [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if a job is still active — at most one
    ///   job exists at a time.
    /// - [`Error::ToolUnavailable`] if the external tooling for `format`
    ///   cannot be located. Checked before any state mutation or network
    ///   activity.
    pub async fn start(
        &self,
        url: impl Into<String>,
        format: MediaFormat,
        item_cap: Option<usize>,
    ) -> Result<JobId> {
        let url = url.into();

        if !self.fetcher.is_available(format) {
            return Err(Error::ToolUnavailable { format });
        }

        let item_cap = item_cap.or_else(|| {
            if is_mix_playlist(&url) {
                debug!(mix_item_cap = self.config.mix_item_cap, "mix playlist detected, applying item cap");
                Some(self.config.mix_item_cap)
            } else {
                None
            }
        });

        let status_message = match item_cap {
            Some(cap) => format!("Preparing first {cap} item(s)..."),
            None => "Preparing downloads...".to_string(),
        };

        let cancel = CancellationToken::new();
        let id = JobId::random();
        {
            let mut slot = self.job.lock();
            if slot.as_ref().is_some_and(|job| job.running) {
                return Err(Error::AlreadyRunning);
            }
            // Replaces the previous finished job, if any
            *slot = Some(Job::new(
                id,
                url.clone(),
                format,
                item_cap,
                cancel.clone(),
                status_message.clone(),
            ));
        }

        self.emit(JobEvent::Status {
            id,
            level: StatusLevel::Info,
            message: status_message.clone(),
        });
        self.emit(JobEvent::Progress {
            id,
            fraction: 0.0,
            text: status_message,
        });

        info!(job_id = %id, %format, ?item_cap, "download job started");
        let worker = self.clone();
        tokio::spawn(async move {
            worker.run_job(id, url, format, item_cap, cancel).await;
        });

        Ok(id)
    }

    /// Request cancellation of the current job.
    ///
    /// Idempotent and safe from any thread; a no-op when no job is running
    /// or cancellation was already requested. The in-flight fetch is not
    /// interrupted — cancellation takes effect before the next entry
    /// begins.
    pub fn cancel(&self) {
        let id = {
            let mut slot = self.job.lock();
            let Some(job) = slot.as_mut() else {
                return;
            };
            if !job.running || job.cancel.is_cancelled() {
                return;
            }
            job.cancel.cancel();
            job.status = StatusLevel::Warning;
            job.status_message = "Cancelling download...".to_string();
            job.id
        };

        info!(job_id = %id, "cancellation requested");
        self.emit(JobEvent::Status {
            id,
            level: StatusLevel::Warning,
            message: "Cancelling download...".to_string(),
        });
    }

    /// An owned, point-in-time view of the current job, if one exists.
    ///
    /// Mid-run snapshots are eventually consistent; once
    /// `snapshot.running == false`, every terminal field is final.
    pub fn snapshot(&self) -> Option<JobSnapshot> {
        self.job.lock().as_ref().map(Job::snapshot)
    }

    /// The id of the current job, if one exists
    pub fn current_job_id(&self) -> Option<JobId> {
        self.job.lock().as_ref().map(|job| job.id)
    }

    /// Whether a job is currently running
    pub fn is_running(&self) -> bool {
        self.job.lock().as_ref().is_some_and(|job| job.running)
    }

    /// Subscribe to the job event stream.
    ///
    /// Every event carries the id of the job it belongs to; discard events
    /// whose id does not match the job you track.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }
}

/// Whether the URL looks like an auto-generated mix playlist
/// (`list=RD...` radio mixes, `list=UL...` uploads mixes).
fn is_mix_playlist(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    parsed
        .query_pairs()
        .any(|(key, value)| key == "list" && (value.starts_with("RD") || value.starts_with("UL")))
}
