//! Scripted collaborators for integration tests, built against the public
//! trait seams only.

use async_trait::async_trait;
use playlist_dl::{
    Config, EntryResolver, Error, JobEvent, JobId, JobSnapshot, MediaFetcher, MediaFormat,
    PlaylistDownloader, PlaylistEntry, PlaylistMetadata, ResolvedPlaylist, Result,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Resolver returning a fixed playlist
pub struct ScriptedResolver {
    pub title: Option<String>,
    pub entries: Vec<PlaylistEntry>,
}

#[async_trait]
impl EntryResolver for ScriptedResolver {
    async fn resolve(&self, _url: &str, item_cap: Option<usize>) -> Result<ResolvedPlaylist> {
        let mut entries = self.entries.clone();
        if let Some(cap) = item_cap {
            entries.truncate(cap);
        }
        Ok(ResolvedPlaylist {
            metadata: PlaylistMetadata {
                title: self.title.clone(),
            },
            entries,
        })
    }

    fn name(&self) -> &'static str {
        "scripted-resolver"
    }
}

/// Fetcher writing scripted files per source URL, or failing
pub struct ScriptedFetcher {
    pub outputs: HashMap<String, Result<Vec<(String, Vec<u8>)>>>,
}

impl ScriptedFetcher {
    pub fn new(outputs: Vec<(&str, Result<Vec<(String, Vec<u8>)>>)>) -> Self {
        Self {
            outputs: outputs
                .into_iter()
                .map(|(url, output)| (url.to_string(), output))
                .collect(),
        }
    }
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        source_url: &str,
        _format: MediaFormat,
        scratch_dir: &Path,
    ) -> Result<()> {
        match self.outputs.get(source_url) {
            Some(Ok(files)) => {
                for (name, payload) in files {
                    std::fs::write(scratch_dir.join(name), payload)?;
                }
                Ok(())
            }
            Some(Err(err)) => Err(Error::Fetch(err.to_string())),
            None => Err(Error::Fetch(format!("no script for {source_url}"))),
        }
    }

    fn is_available(&self, _format: MediaFormat) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "scripted-fetcher"
    }
}

pub fn entry(position: usize, title: &str, url: &str) -> PlaylistEntry {
    PlaylistEntry {
        title: Some(title.to_string()),
        duration_seconds: Some(120.0),
        source_url: Some(url.to_string()),
        index: position,
    }
}

pub fn downloader(
    title: &str,
    entries: Vec<PlaylistEntry>,
    outputs: Vec<(&str, Result<Vec<(String, Vec<u8>)>>)>,
) -> PlaylistDownloader {
    PlaylistDownloader::with_collaborators(
        Config::default(),
        Arc::new(ScriptedResolver {
            title: Some(title.to_string()),
            entries,
        }),
        Arc::new(ScriptedFetcher::new(outputs)),
    )
}

/// Wait for the `Finished` event of `id`, then return the final snapshot.
pub async fn wait_for_finish(
    downloader: &PlaylistDownloader,
    rx: &mut broadcast::Receiver<JobEvent>,
    id: JobId,
) -> JobSnapshot {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for job to finish")
            .expect("event channel closed");
        if matches!(event, JobEvent::Finished { id: event_id } if event_id == id) {
            break;
        }
    }
    let snapshot = downloader.snapshot().expect("job state must exist");
    assert!(!snapshot.running);
    snapshot
}
