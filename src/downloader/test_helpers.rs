//! Shared helpers for downloader tests — scripted collaborators.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::MediaFetcher;
use crate::resolver::{EntryResolver, PlaylistEntry, PlaylistMetadata, ResolvedPlaylist};
use crate::types::{JobEvent, JobId, JobSnapshot, MediaFormat};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};

use super::PlaylistDownloader;

/// Build a playlist entry for tests
pub(crate) fn entry(position: usize, title: &str, url: Option<&str>) -> PlaylistEntry {
    PlaylistEntry {
        title: Some(title.to_string()),
        duration_seconds: Some(60.0 * position as f64),
        source_url: url.map(str::to_string),
        index: position,
    }
}

type ResolveFn =
    Box<dyn Fn(&str, Option<usize>) -> Result<ResolvedPlaylist> + Send + Sync>;

/// Scripted resolver: returns a fixed playlist, an error, or records the
/// arguments it was called with.
pub(crate) struct FakeResolver {
    behavior: ResolveFn,
    pub(crate) seen_caps: Arc<Mutex<Vec<Option<usize>>>>,
}

impl FakeResolver {
    pub(crate) fn with_entries(title: &str, entries: Vec<PlaylistEntry>) -> Self {
        let title = title.to_string();
        Self::from_fn(move |_, _| {
            Ok(ResolvedPlaylist {
                metadata: PlaylistMetadata {
                    title: Some(title.clone()),
                },
                entries: entries.clone(),
            })
        })
    }

    pub(crate) fn empty() -> Self {
        Self::from_fn(|_, _| Ok(ResolvedPlaylist::default()))
    }

    pub(crate) fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_, _| Err(Error::Resolution(message.clone())))
    }

    pub(crate) fn from_fn(
        behavior: impl Fn(&str, Option<usize>) -> Result<ResolvedPlaylist> + Send + Sync + 'static,
    ) -> Self {
        Self {
            behavior: Box::new(behavior),
            seen_caps: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl EntryResolver for FakeResolver {
    async fn resolve(&self, url: &str, item_cap: Option<usize>) -> Result<ResolvedPlaylist> {
        self.seen_caps.lock().unwrap().push(item_cap);
        let mut resolved = (self.behavior)(url, item_cap)?;
        if let Some(cap) = item_cap {
            resolved.entries.truncate(cap);
        }
        Ok(resolved)
    }

    fn name(&self) -> &'static str {
        "fake-resolver"
    }
}

/// A two-way gate used to pause a fake fetch deterministically: the fetcher
/// signals `entered` once the scripted files are written, then waits for
/// `resume` before returning.
#[derive(Default)]
pub(crate) struct FetchGate {
    pub(crate) entered: Notify,
    pub(crate) resume: Notify,
}

/// What a fake fetch should do for one URL
#[derive(Clone)]
pub(crate) enum FetchScript {
    /// Write the listed (filename, payload) pairs into the scratch dir
    Produce(Vec<(String, Vec<u8>)>),
    /// Fail with this message
    Fail(String),
}

/// Scripted fetcher keyed by source URL.
pub(crate) struct FakeFetcher {
    scripts: HashMap<String, FetchScript>,
    available: bool,
    /// Pause inside the fetch for this URL (after writing files)
    pause_on: Option<(String, Arc<FetchGate>)>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new(scripts: Vec<(&str, FetchScript)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(url, script)| (url.to_string(), script))
                .collect(),
            available: true,
            pause_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            scripts: HashMap::new(),
            available: false,
            pause_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn pause_on(mut self, url: &str, gate: Arc<FetchGate>) -> Self {
        self.pause_on = Some((url.to_string(), gate));
        self
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(
        &self,
        source_url: &str,
        _format: MediaFormat,
        scratch_dir: &Path,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(source_url.to_string());

        let script = self
            .scripts
            .get(source_url)
            .cloned()
            .unwrap_or_else(|| FetchScript::Fail(format!("no script for {source_url}")));

        let result = match script {
            FetchScript::Produce(files) => {
                for (name, payload) in files {
                    std::fs::write(scratch_dir.join(name), payload)?;
                }
                Ok(())
            }
            FetchScript::Fail(message) => Err(Error::Fetch(message)),
        };

        if let Some((gate_url, gate)) = &self.pause_on
            && gate_url == source_url
        {
            gate.entered.notify_one();
            gate.resume.notified().await;
        }

        result
    }

    fn is_available(&self, _format: MediaFormat) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "fake-fetcher"
    }
}

/// Downloader wired with fakes and a default config
pub(crate) fn downloader_with(
    resolver: FakeResolver,
    fetcher: FakeFetcher,
) -> PlaylistDownloader {
    PlaylistDownloader::with_collaborators(
        Config::default(),
        Arc::new(resolver),
        Arc::new(fetcher),
    )
}

/// Drain events until `Finished` arrives for `id`, then return everything
/// received (including the terminal event). Panics after five seconds.
pub(crate) async fn collect_until_finished(
    rx: &mut broadcast::Receiver<JobEvent>,
    id: JobId,
) -> Vec<JobEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for job to finish")
            .expect("event channel closed");
        let finished = matches!(&event, JobEvent::Finished { id: event_id } if *event_id == id);
        events.push(event);
        if finished {
            return events;
        }
    }
}

/// Wait for the job to finish and return its final snapshot.
pub(crate) async fn finished_snapshot(
    downloader: &PlaylistDownloader,
    rx: &mut broadcast::Receiver<JobEvent>,
    id: JobId,
) -> JobSnapshot {
    collect_until_finished(rx, id).await;
    let snapshot = downloader.snapshot().expect("job state must exist");
    assert!(!snapshot.running, "Finished implies running == false");
    snapshot
}
