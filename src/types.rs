//! Core types and events for playlist-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for a download job
///
/// An opaque, collision-resistant token assigned when a job is accepted.
/// Every event carries the id of the job it belongs to, so consumers can
/// discard events from a job they no longer track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    /// Generate a fresh random job id
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<JobId> for u64 {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Target output format for a download job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Audio-only output, transcoded to MP3
    Audio,
    /// Video output, muxed into MP4
    Video,
}

impl MediaFormat {
    /// Preferred container extension for this format
    pub fn container(&self) -> &'static str {
        match self {
            MediaFormat::Audio => "mp3",
            MediaFormat::Video => "mp4",
        }
    }

    /// Suffix used in bundle archive names (e.g. "my-playlist-mp3s.zip")
    pub fn archive_suffix(&self) -> &'static str {
        match self {
            MediaFormat::Audio => "mp3s",
            MediaFormat::Video => "mp4s",
        }
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaFormat::Audio => write!(f, "audio"),
            MediaFormat::Video => write!(f, "video"),
        }
    }
}

/// Aggregate status severity of a job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Informational (job preparing or mid-run)
    Info,
    /// Job finished without a terminal error
    Success,
    /// Cancellation requested or completed
    Warning,
    /// Job ended with a terminal error
    Error,
}

/// A successfully processed playlist entry
///
/// Holds the fetched media payload in memory; jobs share items between the
/// state slot, events, and snapshots via `Arc`, so the bytes are never
/// duplicated.
#[derive(Clone, Debug)]
pub struct CompletedItem {
    /// Entry title as reported by resolution (or a positional placeholder)
    pub title: String,
    /// Output filename, unique within the job
    pub filename: String,
    /// Raw media bytes
    pub payload: Vec<u8>,
    /// MIME type classified from the filename extension
    pub mime: &'static str,
    /// Duration in whole seconds, when known
    pub duration_seconds: Option<u32>,
    /// The entry-level URL the item was fetched from
    pub source_url: String,
    /// 1-based position within the resolved playlist
    pub position: usize,
    /// Collision-resistant per-item token (UI identity)
    pub token: String,
}

/// A playlist entry that could not be processed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedItem {
    /// Entry title as reported by resolution (or a positional placeholder)
    pub title: String,
    /// Why the entry failed
    pub error: String,
    /// 1-based position within the resolved playlist
    pub position: usize,
}

/// The final archive bundling every completed item's payload
#[derive(Clone, Debug)]
pub struct Bundle {
    /// Archive filename (slugified playlist title plus format suffix)
    pub name: String,
    /// ZIP bytes
    pub payload: Vec<u8>,
}

/// Event emitted during a job's lifecycle
///
/// Events are broadcast to every subscriber; each carries the [`JobId`] it
/// belongs to. Consumers tracking a specific job discard events whose id
/// does not match.
#[derive(Clone, Debug)]
pub enum JobEvent {
    /// Aggregate status changed
    Status {
        /// Job the event belongs to
        id: JobId,
        /// New status severity
        level: StatusLevel,
        /// Human-readable status message
        message: String,
    },

    /// Progress fraction changed
    Progress {
        /// Job the event belongs to
        id: JobId,
        /// Progress in [0.0, 1.0]
        fraction: f32,
        /// Human-readable progress text
        text: String,
    },

    /// Total entry count became known after resolution
    TotalKnown {
        /// Job the event belongs to
        id: JobId,
        /// Number of entries that will be processed
        count: usize,
    },

    /// An entry finished successfully
    ItemSucceeded {
        /// Job the event belongs to
        id: JobId,
        /// The completed item (payload shared, not copied)
        item: Arc<CompletedItem>,
    },

    /// An entry failed (item-local, the job continues)
    ItemFailed {
        /// Job the event belongs to
        id: JobId,
        /// Entry title
        title: String,
        /// Failure reason
        error: String,
    },

    /// The job reached its terminal state; snapshots are now final
    Finished {
        /// Job the event belongs to
        id: JobId,
    },
}

/// An owned, point-in-time view of the current job
///
/// Snapshots are eventually consistent: a reader polling mid-run may observe
/// a state between two per-item updates. `running == false` guarantees every
/// terminal field (`archive`, `status`, `status_message`, `progress`,
/// `terminal_error`) has been written.
#[derive(Clone, Debug)]
pub struct JobSnapshot {
    /// Job identity
    pub id: JobId,
    /// The playlist URL the job was started with
    pub source_url: String,
    /// Requested output format
    pub format: MediaFormat,
    /// Effective item cap (explicit or mix auto-cap), if any
    pub item_cap: Option<usize>,
    /// Whether the worker is still running
    pub running: bool,
    /// Playlist title, known only after resolution
    pub playlist_title: Option<String>,
    /// Total entry count, known only after resolution
    pub total_items: Option<usize>,
    /// Completed items, in processing order
    pub items: Vec<Arc<CompletedItem>>,
    /// Failed items, in processing order
    pub failures: Vec<FailedItem>,
    /// The final bundle, present once ≥1 item completed and the run ended
    pub archive: Option<Arc<Bundle>>,
    /// Aggregate status severity
    pub status: StatusLevel,
    /// Human-readable status message
    pub status_message: String,
    /// Progress fraction in [0.0, 1.0]
    pub progress: f32,
    /// Human-readable progress text
    pub progress_text: String,
    /// Whether cancellation has been requested
    pub cancel_requested: bool,
    /// Terminal error message, if the run aborted
    pub terminal_error: Option<String>,
    /// When the job was accepted
    pub started_at: DateTime<Utc>,
}
