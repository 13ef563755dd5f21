//! yt-dlp backed playlist resolution
//!
//! Runs `yt-dlp --dump-single-json --flat-playlist` and maps its JSON into
//! [`ResolvedPlaylist`]. Flat extraction returns entry stubs (title, url,
//! duration) without touching individual videos, so resolving even a large
//! playlist is a single network round.

use super::{EntryResolver, PlaylistEntry, PlaylistMetadata, ResolvedPlaylist};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Raw playlist shape of `yt-dlp --dump-single-json --flat-playlist`
#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    title: Option<String>,
    /// Absent for single-video URLs; entry slots may be null for
    /// unavailable videos when `--ignore-errors` is active
    entries: Option<Vec<Option<RawEntry>>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    playlist_index: Option<usize>,
}

/// Resolver that shells out to the yt-dlp binary
pub struct YtDlpResolver {
    binary_path: PathBuf,
}

impl YtDlpResolver {
    /// Create a resolver with an explicit yt-dlp path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Map raw yt-dlp JSON to the resolver contract
    fn parse_output(raw: &[u8]) -> Result<ResolvedPlaylist> {
        let playlist: RawPlaylist = serde_json::from_slice(raw)
            .map_err(|e| Error::Resolution(format!("unexpected yt-dlp output: {e}")))?;

        let Some(raw_entries) = playlist.entries else {
            return Err(Error::NotAPlaylist);
        };

        let mut entries = Vec::with_capacity(raw_entries.len());
        for (slot, raw_entry) in raw_entries.into_iter().enumerate() {
            // Null slots are videos yt-dlp could not inspect; skip them but
            // keep the positional fallback index aligned with the source.
            let Some(raw_entry) = raw_entry else { continue };
            let index = raw_entry.playlist_index.unwrap_or(slot + 1);
            let source_url = raw_entry.webpage_url.or(raw_entry.url);
            entries.push(PlaylistEntry {
                title: raw_entry.title,
                duration_seconds: raw_entry.duration,
                source_url,
                index,
            });
        }

        Ok(ResolvedPlaylist {
            metadata: PlaylistMetadata {
                title: playlist.title,
            },
            entries,
        })
    }
}

#[async_trait]
impl EntryResolver for YtDlpResolver {
    async fn resolve(&self, url: &str, item_cap: Option<usize>) -> Result<ResolvedPlaylist> {
        let mut command = Command::new(&self.binary_path);
        command
            .arg("--dump-single-json")
            .arg("--flat-playlist")
            .arg("--ignore-errors")
            .arg("--no-warnings")
            .arg("--quiet");
        if let Some(cap) = item_cap {
            command.arg("--playlist-items").arg(format!("1:{cap}"));
        }
        command.arg(url);

        debug!(%url, ?item_cap, "resolving playlist entries");
        let output = command
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("failed to execute yt-dlp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("yt-dlp exited with an error")
                .trim()
                .to_string();
            return Err(Error::Resolution(reason));
        }

        let mut resolved = Self::parse_output(&output.stdout)?;
        // --playlist-items already limits the fetch; truncation covers
        // sources that ignore the range selector.
        if let Some(cap) = item_cap {
            resolved.entries.truncate(cap);
        }
        Ok(resolved)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
