//! External binary discovery
//!
//! The production resolver and fetcher shell out to yt-dlp and FFmpeg.
//! Lookup order: an explicitly configured path wins, then PATH search
//! (unless disabled). Callers memoize the result — tool locations do not
//! change mid-process.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Locate an external binary.
///
/// * `explicit` — a configured path or bare program name; an existing path
///   is used as-is, anything else is resolved through PATH.
/// * `name` — the program name to search PATH for when nothing is configured.
/// * `search_path` — whether PATH search is allowed at all.
///
/// # Examples
///
/// ```
/// use playlist_dl::tools::find_tool;
///
/// // No override, PATH search disabled: never found.
/// assert!(find_tool(None, "ffmpeg", false).is_none());
/// ```
#[must_use]
pub fn find_tool(explicit: Option<&Path>, name: &str, search_path: bool) -> Option<PathBuf> {
    if let Some(configured) = explicit {
        if configured.exists() {
            debug!(tool = name, path = %configured.display(), "using configured tool path");
            return Some(configured.to_path_buf());
        }
        // A configured bare name still goes through PATH resolution
        return which::which(configured).ok();
    }

    if search_path {
        let resolved = which::which(name).ok();
        if let Some(path) = &resolved {
            debug!(tool = name, path = %path.display(), "tool discovered on PATH");
        }
        return resolved;
    }

    None
}
