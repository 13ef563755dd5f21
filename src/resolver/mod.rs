//! Playlist entry resolution
//!
//! The resolver turns a playlist URL into ordered entries with metadata,
//! without downloading any media. It is a trait so the orchestrator can be
//! driven by the production yt-dlp implementation or by scripted
//! collaborators in tests.

mod ytdlp;

pub use ytdlp::YtDlpResolver;

use crate::error::Result;
use async_trait::async_trait;

/// Playlist-level metadata known after resolution
#[derive(Clone, Debug, Default)]
pub struct PlaylistMetadata {
    /// Playlist title, when the source reports one
    pub title: Option<String>,
}

/// One playlist element as reported by resolution, prior to fetching
#[derive(Clone, Debug)]
pub struct PlaylistEntry {
    /// Entry title, when known
    pub title: Option<String>,
    /// Raw duration in seconds, when known
    pub duration_seconds: Option<f64>,
    /// Entry-level permalink used for fetching; entries without one are
    /// recorded as failed items by the orchestrator
    pub source_url: Option<String>,
    /// 1-based index within the playlist
    pub index: usize,
}

/// Result of resolving a playlist URL
#[derive(Clone, Debug, Default)]
pub struct ResolvedPlaylist {
    /// Playlist-level metadata
    pub metadata: PlaylistMetadata,
    /// Ordered playlist entries
    pub entries: Vec<PlaylistEntry>,
}

/// Trait for resolving a playlist URL into ordered entries
///
/// Returning an empty entry list is a valid, non-failing outcome; the
/// orchestrator decides how to surface it. Errors mean the URL could not be
/// resolved at all (network failure, parse failure, not a playlist).
#[async_trait]
pub trait EntryResolver: Send + Sync {
    /// Resolve `url` into playlist metadata and ordered entries.
    ///
    /// `item_cap` limits resolution to the first N entries; implementations
    /// should push the cap down to the source where possible and must not
    /// return more than `item_cap` entries.
    async fn resolve(&self, url: &str, item_cap: Option<usize>) -> Result<ResolvedPlaylist>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
