//! Media file selection and classification
//!
//! A fetch may leave more than one new file in the scratch directory (a
//! muxed container plus leftovers from intermediate streams). Selection is
//! deterministic for a given candidate set: ranked extensions per target
//! format, then any recognized media extension, then an arbitrary-but-stable
//! candidate. Ties within one extension are broken lexicographically, never
//! by filesystem order.

use crate::types::MediaFormat;
use std::path::{Path, PathBuf};

/// Ranked extension priority for audio output (preferred codec first)
const AUDIO_EXTENSION_PRIORITY: &[&str] = &["mp3", "m4a", "opus", "webm", "aac"];

/// Ranked extension priority for video output (preferred container first)
const VIDEO_EXTENSION_PRIORITY: &[&str] = &["mp4", "mkv", "webm", "m4v", "mov"];

/// Extensions recognized as media for the generic fallback
const RECOGNIZED_MEDIA_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "aac", "opus", "ogg", "mp4", "mkv", "webm", "m4v", "mov",
];

/// Ranked extension list for a target format
#[must_use]
pub fn extension_priority(format: MediaFormat) -> &'static [&'static str] {
    match format {
        MediaFormat::Audio => AUDIO_EXTENSION_PRIORITY,
        MediaFormat::Video => VIDEO_EXTENSION_PRIORITY,
    }
}

/// Select the most appropriate media file from a candidate set.
///
/// Returns `None` only for an empty candidate set. Repeated calls with the
/// same candidates and format return the same path.
///
/// # Examples
///
/// ```
/// use playlist_dl::media::choose_media_file;
/// use playlist_dl::MediaFormat;
/// use std::path::PathBuf;
///
/// let candidates = vec![PathBuf::from("a.webm"), PathBuf::from("a.m4a")];
/// let chosen = choose_media_file(&candidates, MediaFormat::Audio);
/// assert_eq!(chosen, Some(PathBuf::from("a.m4a")));
/// ```
#[must_use]
pub fn choose_media_file(candidates: &[PathBuf], format: MediaFormat) -> Option<PathBuf> {
    if candidates.is_empty() {
        return None;
    }

    let mut sorted: Vec<&PathBuf> = candidates.iter().collect();
    sorted.sort();

    for wanted in extension_priority(format) {
        for path in &sorted {
            if extension_of(path).as_deref() == Some(*wanted) {
                return Some((*path).clone());
            }
        }
    }

    for path in &sorted {
        if let Some(ext) = extension_of(path)
            && RECOGNIZED_MEDIA_EXTENSIONS.contains(&ext.as_str())
        {
            return Some((*path).clone());
        }
    }

    sorted.first().map(|path| (*path).clone())
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Classify a filename's MIME type by extension
#[must_use]
pub fn guess_mime(filename: &str) -> &'static str {
    match extension_of(Path::new(filename)).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("opus") => "audio/opus",
        Some("ogg") => "audio/ogg",
        Some("webm") => "video/webm",
        Some("mp4") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("m4v") => "video/x-m4v",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Normalize a raw duration to whole, non-negative seconds
#[must_use]
pub fn normalize_duration(value: Option<f64>) -> Option<u32> {
    let seconds = value?;
    if !seconds.is_finite() {
        return None;
    }
    Some(seconds.round().max(0.0) as u32)
}

/// Format a duration as `h:mm:ss` or `m:ss`; empty string when unknown
#[must_use]
pub fn format_duration(seconds: Option<u32>) -> String {
    let Some(seconds) = seconds else {
        return String::new();
    };
    let (minutes, remainder) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{remainder:02}")
    } else {
        format!("{minutes}:{remainder:02}")
    }
}
