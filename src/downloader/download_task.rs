//! Per-job worker execution — resolution, the entry loop, finalization.
//!
//! The worker owns the job's scratch directory (a `TempDir`, removed on
//! drop along every exit path) and is the only writer of job state while it
//! runs. Entries are processed strictly in resolved order; the total count
//! is reported before any per-item outcome, and entry N's outcome is
//! reported before entry N+1 begins.
//!
//! Cancellation is cooperative and polled once per entry, at the top of the
//! loop. An unresponsive resolver or fetcher blocks the worker until it
//! returns; cancellation then only prevents the next entry from starting.

use crate::error::Result;
use crate::media;
use crate::resolver::PlaylistEntry;
use crate::types::{CompletedItem, FailedItem, JobId, MediaFormat, StatusLevel};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Drive one job from resolution to its terminal state.
    pub(crate) async fn run_job(
        &self,
        id: JobId,
        url: String,
        format: MediaFormat,
        item_cap: Option<usize>,
        cancel: CancellationToken,
    ) {
        let resolved = match self.resolver.resolve(&url, item_cap).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(job_id = %id, error = %err, "playlist resolution failed");
                self.fail_job(id, err.to_string());
                return;
            }
        };

        if resolved.entries.is_empty() {
            self.fail_job(id, crate::Error::EmptyPlaylist.to_string());
            return;
        }

        let total = resolved.entries.len();
        self.set_resolved(id, resolved.metadata.title.clone(), total);
        info!(
            job_id = %id,
            total_items = total,
            title = ?resolved.metadata.title,
            "playlist resolved"
        );

        let scratch = match self.create_scratch_dir() {
            Ok(scratch) => scratch,
            Err(err) => {
                self.fail_job(id, err.to_string());
                return;
            }
        };

        let mut used_names: HashSet<String> = HashSet::new();
        for (position, entry) in resolved.entries.iter().enumerate() {
            let position = position + 1;

            if cancel.is_cancelled() {
                info!(job_id = %id, position, "cancellation observed, stopping iteration");
                self.update_status(id, StatusLevel::Warning, "Download cancelled by user.");
                break;
            }

            let title = entry
                .title
                .clone()
                .unwrap_or_else(|| format!("Video {position}"));
            self.update_status(
                id,
                StatusLevel::Info,
                format!("Downloading {title} ({position}/{total})"),
            );

            match self
                .process_entry(entry, &title, format, position, scratch.path(), &mut used_names)
                .await
            {
                Ok(item) => {
                    debug!(job_id = %id, position, filename = %item.filename, "item completed");
                    self.push_item(id, item);
                }
                Err(error) => {
                    debug!(job_id = %id, position, %error, "item failed");
                    self.push_failure(
                        id,
                        FailedItem {
                            title,
                            error,
                            position,
                        },
                    );
                }
            }

            self.update_progress(
                id,
                position as f32 / total as f32,
                format!("Processed {position}/{total}"),
            );
        }

        self.finalize_job(id);
        // `scratch` drops here, removing the per-job directory
    }

    /// Process one entry to a terminal disposition.
    ///
    /// Returns the completed item, or the failure message to record. All
    /// failure modes here are item-local.
    async fn process_entry(
        &self,
        entry: &PlaylistEntry,
        title: &str,
        format: MediaFormat,
        position: usize,
        scratch: &Path,
        used_names: &mut HashSet<String>,
    ) -> std::result::Result<Arc<CompletedItem>, String> {
        let Some(source_url) = entry.source_url.as_deref() else {
            return Err("Missing video URL".to_string());
        };

        let before = snapshot_files(scratch).map_err(|e| e.to_string())?;

        self.fetcher
            .fetch(source_url, format, scratch)
            .await
            .map_err(|e| e.to_string())?;

        let after = snapshot_files(scratch).map_err(|e| e.to_string())?;
        let candidates: Vec<PathBuf> = after.difference(&before).cloned().collect();
        let Some(media_file) = media::choose_media_file(&candidates, format) else {
            return Err("Media file not produced".to_string());
        };

        let payload = tokio::fs::read(&media_file)
            .await
            .map_err(|e| format!("failed to read produced file: {e}"))?;
        if let Err(err) = tokio::fs::remove_file(&media_file).await {
            // Scratch cleanup happens on drop anyway; freeing early just
            // bounds peak disk usage.
            debug!(path = %media_file.display(), error = %err, "failed to remove scratch file");
        }

        let produced_name = media_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("item-{position}.{}", format.container()));
        let filename = unique_filename(produced_name, used_names);

        Ok(Arc::new(CompletedItem {
            title: title.to_string(),
            mime: media::guess_mime(&filename),
            filename,
            payload,
            duration_seconds: media::normalize_duration(entry.duration_seconds),
            source_url: source_url.to_string(),
            position,
            token: item_token(position),
        }))
    }

    /// Create the job-private scratch directory.
    fn create_scratch_dir(&self) -> Result<tempfile::TempDir> {
        let scratch = match &self.config.scratch_dir {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                tempfile::Builder::new()
                    .prefix("playlist-dl-")
                    .tempdir_in(root)?
            }
            None => tempfile::Builder::new().prefix("playlist-dl-").tempdir()?,
        };
        debug!(path = %scratch.path().display(), "scratch directory created");
        Ok(scratch)
    }
}

/// Snapshot the set of regular files in `dir`.
fn snapshot_files(dir: &Path) -> std::io::Result<HashSet<PathBuf>> {
    let mut files = HashSet::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.insert(path);
        }
    }
    Ok(files)
}

/// Reserve a filename unique within the job, renaming "name.ext" to
/// "name (1).ext", "name (2).ext", ... on collision.
fn unique_filename(candidate: String, used: &mut HashSet<String>) -> String {
    if used.insert(candidate.clone()) {
        return candidate;
    }

    let path = Path::new(&candidate);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| candidate.clone());
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    let mut attempt = 1u32;
    loop {
        let next = match &extension {
            Some(ext) => format!("{stem} ({attempt}).{ext}"),
            None => format!("{stem} ({attempt})"),
        };
        if used.insert(next.clone()) {
            return next;
        }
        attempt += 1;
    }
}

/// Collision-resistant per-item token (position plus random hex).
fn item_token(position: usize) -> String {
    format!("{position}-{:016x}", rand::random::<u64>())
}
