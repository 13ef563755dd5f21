//! Error types for playlist-dl
//!
//! The taxonomy mirrors the job lifecycle:
//! - Startup-rejecting errors ([`Error::AlreadyRunning`],
//!   [`Error::ToolUnavailable`]) are returned synchronously from `start`
//!   before any background work begins.
//! - Job-terminal errors ([`Error::Resolution`], [`Error::NotAPlaylist`],
//!   [`Error::EmptyPlaylist`]) abort the whole run and surface on the job's
//!   terminal state.
//! - Item-local failures ([`Error::Fetch`], [`Error::ExternalTool`], I/O)
//!   are absorbed by the orchestrator and recorded as failed items; they
//!   never abort a run.

use crate::types::MediaFormat;
use thiserror::Error;

/// Result type alias for playlist-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-dl
#[derive(Debug, Error)]
pub enum Error {
    /// A download job is already running — wait for it or cancel it first
    #[error("a download job is already running; wait for it to finish or cancel it")]
    AlreadyRunning,

    /// The external tooling required for the requested format is missing
    #[error(
        "required external tools for {format} output were not found; \
         install yt-dlp and FFmpeg or configure explicit paths"
    )]
    ToolUnavailable {
        /// The format whose tooling could not be located
        format: MediaFormat,
    },

    /// Playlist metadata could not be retrieved (network, parsing, access)
    #[error("unable to retrieve playlist metadata: {0}")]
    Resolution(String),

    /// The URL resolved to something that is not a playlist
    #[error("the provided URL does not point to a valid playlist")]
    NotAPlaylist,

    /// The playlist resolved but contained nothing downloadable
    #[error("No downloadable videos were found in this playlist.")]
    EmptyPlaylist,

    /// A single item failed to fetch (absorbed per-item, never job-fatal)
    #[error("{0}")]
    Fetch(String),

    /// External tool execution failed (spawn error, abnormal exit)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
