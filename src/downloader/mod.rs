//! Core downloader implementation split into focused submodules.
//!
//! The [`PlaylistDownloader`] struct and its methods are organized by
//! domain:
//! - [`control`] — job admission (start), cancellation, snapshots, event
//!   subscription
//! - [`state`] — the single-job state slot and identity-guarded mutation
//! - [`download_task`] — the per-job worker loop and finalization
//!
//! One job at a time: `start` is a compare-and-swap on "is a job active",
//! so no two workers ever mutate job state concurrently. The caller's
//! thread and the worker are fully parallel; the caller polls
//! [`PlaylistDownloader::snapshot`] or drains
//! [`PlaylistDownloader::subscribe`] while the worker runs.

mod control;
mod download_task;
pub(crate) mod state;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{MediaFetcher, YtDlpFetcher};
use crate::resolver::{EntryResolver, YtDlpResolver};
use crate::tools;
use crate::types::JobEvent;
use state::JobSlot;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Main downloader instance (cloneable — all fields are Arc-wrapped)
///
/// Owns at most one download job at a time. Consumers subscribe to the
/// event stream or poll snapshots; both are safe from any thread.
#[derive(Clone)]
pub struct PlaylistDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Playlist resolution collaborator
    pub(crate) resolver: Arc<dyn EntryResolver>,
    /// Per-item fetch collaborator
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<JobEvent>,
    /// Single-job state slot shared between the caller and the worker
    pub(crate) job: Arc<JobSlot>,
}

impl PlaylistDownloader {
    /// Create a downloader backed by the yt-dlp resolver and fetcher.
    ///
    /// Fails with [`crate::Error::ExternalTool`] if yt-dlp cannot be
    /// located — without it neither resolution nor fetching can work.
    /// FFmpeg availability is checked per-job at `start` instead, since it
    /// is a per-format precondition.
    pub fn new(config: Config) -> Result<Self> {
        let ytdlp = tools::find_tool(
            config.tools.ytdlp_path.as_deref(),
            "yt-dlp",
            config.tools.search_path,
        )
        .ok_or_else(|| {
            crate::Error::ExternalTool(
                "yt-dlp was not found; install it or set tools.ytdlp_path".to_string(),
            )
        })?;

        let resolver = Arc::new(YtDlpResolver::new(ytdlp));
        let fetcher = Arc::new(YtDlpFetcher::from_config(&config));
        Ok(Self::with_collaborators(config, resolver, fetcher))
    }

    /// Create a downloader with explicit collaborators.
    ///
    /// This is the seam for embedding alternative extraction engines and
    /// for driving the orchestrator with scripted collaborators in tests.
    pub fn with_collaborators(
        config: Config,
        resolver: Arc<dyn EntryResolver>,
        fetcher: Arc<dyn MediaFetcher>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config: Arc::new(config),
            resolver,
            fetcher,
            event_tx,
            job: Arc::new(JobSlot::default()),
        }
    }
}
