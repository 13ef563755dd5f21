//! Title slugs and bundle construction
//!
//! The final artifact of a job is a single in-memory ZIP holding every
//! completed item's payload under its filename, named from the slugified
//! playlist title plus a format suffix.

use crate::error::{Error, Result};
use crate::types::{Bundle, CompletedItem, MediaFormat};
use regex::Regex;
use std::io::{Cursor, Write};
use std::sync::{Arc, OnceLock};
use tracing::debug;
use zip::write::FileOptions;

/// Reduce a title to a filesystem-safe slug.
///
/// Strips everything but word characters, whitespace, and hyphens, collapses
/// whitespace/hyphen runs into single hyphens, and trims edge separators.
/// Falls back to `"playlist"` when nothing survives.
///
/// # Examples
///
/// ```
/// use playlist_dl::archive::slugify;
///
/// assert_eq!(slugify("My Playlist!"), "My-Playlist");
/// assert_eq!(slugify("***"), "playlist");
/// ```
#[must_use]
pub fn slugify(value: &str) -> String {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    static COLLAPSE: OnceLock<Regex> = OnceLock::new();
    // Both patterns are constants; compilation cannot fail.
    #[allow(clippy::expect_used)]
    let strip = STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").expect("static slug regex"));
    #[allow(clippy::expect_used)]
    let collapse = COLLAPSE.get_or_init(|| Regex::new(r"[-\s]+").expect("static slug regex"));

    let cleaned = strip.replace_all(value, "");
    let collapsed = collapse.replace_all(&cleaned, "-");
    let trimmed = collapsed.trim_matches(['-', '_']);
    if trimmed.is_empty() {
        "playlist".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build the archive filename for a job: `{slug}-{mp3s|mp4s}.zip`
#[must_use]
pub fn archive_name(playlist_title: Option<&str>, format: MediaFormat) -> String {
    format!(
        "{}-{}.zip",
        slugify(playlist_title.unwrap_or("")),
        format.archive_suffix()
    )
}

/// Bundle every completed item into one deflated ZIP archive.
///
/// Item filenames are unique within a job, so each becomes one archive
/// entry; payload bytes are stored verbatim.
pub fn build_bundle(name: String, items: &[Arc<CompletedItem>]) -> Result<Bundle> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for item in items {
        writer
            .start_file(item.filename.clone(), options)
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "failed to add {} to bundle: {e}",
                    item.filename
                )))
            })?;
        writer.write_all(&item.payload)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| Error::Io(std::io::Error::other(format!("failed to finish bundle: {e}"))))?;
    let payload = cursor.into_inner();
    debug!(
        bundle = %name,
        items = items.len(),
        bytes = payload.len(),
        "bundle built"
    );

    Ok(Bundle { name, payload })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn item(filename: &str, payload: &[u8], position: usize) -> Arc<CompletedItem> {
        Arc::new(CompletedItem {
            title: filename.to_string(),
            filename: filename.to_string(),
            payload: payload.to_vec(),
            mime: "audio/mpeg",
            duration_seconds: None,
            source_url: "https://example.com/watch?v=x".to_string(),
            position,
            token: format!("{position}-deadbeef"),
        })
    }

    #[test]
    fn slugify_keeps_words_and_hyphenates_spaces() {
        assert_eq!(slugify("My Playlist!"), "My-Playlist");
        assert_eq!(slugify("lofi beats — to relax"), "lofi-beats-to-relax");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("--edgy title--"), "edgy-title");
    }

    #[test]
    fn slugify_falls_back_when_nothing_survives() {
        assert_eq!(slugify(""), "playlist");
        assert_eq!(slugify("***"), "playlist");
        assert_eq!(slugify("  "), "playlist");
    }

    #[test]
    fn archive_name_combines_slug_and_format_suffix() {
        assert_eq!(
            archive_name(Some("Road Trip 2024"), MediaFormat::Audio),
            "Road-Trip-2024-mp3s.zip"
        );
        assert_eq!(
            archive_name(Some("Road Trip 2024"), MediaFormat::Video),
            "Road-Trip-2024-mp4s.zip"
        );
    }

    #[test]
    fn archive_name_without_title_uses_fallback_slug() {
        assert_eq!(archive_name(None, MediaFormat::Audio), "playlist-mp3s.zip");
        assert_eq!(archive_name(Some("!!"), MediaFormat::Video), "playlist-mp4s.zip");
    }

    #[test]
    fn bundle_round_trips_every_item_byte_identically() {
        let items = vec![
            item("01 - First.mp3", b"first-bytes", 1),
            item("02 - Second.mp3", b"second-bytes", 2),
        ];
        let bundle = build_bundle("test-mp3s.zip".to_string(), &items).unwrap();
        assert_eq!(bundle.name, "test-mp3s.zip");

        let mut archive = zip::ZipArchive::new(Cursor::new(bundle.payload)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut names = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).unwrap();
            let mut bytes = Vec::new();
            std::io::copy(&mut entry, &mut bytes).unwrap();
            names.push((entry.name().to_string(), bytes));
        }
        names.sort();
        assert_eq!(
            names,
            vec![
                ("01 - First.mp3".to_string(), b"first-bytes".to_vec()),
                ("02 - Second.mp3".to_string(), b"second-bytes".to_vec()),
            ]
        );
    }

    #[test]
    fn empty_item_list_builds_an_empty_archive() {
        // The orchestrator never bundles zero items, but the builder itself
        // must not choke on the degenerate input.
        let bundle = build_bundle("empty-mp3s.zip".to_string(), &[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bundle.payload)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
