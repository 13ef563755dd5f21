//! Media fetch collaborator
//!
//! A fetcher downloads (and transcodes, if needed) a single playlist entry
//! into a scratch directory. It is side-effect only: implementations do not
//! report which files they produced — the orchestrator discovers output by
//! diffing the directory contents around the call and applying the
//! selection policy in [`crate::media`].

mod ytdlp;

pub use ytdlp::YtDlpFetcher;

use crate::error::Result;
use crate::types::MediaFormat;
use async_trait::async_trait;
use std::path::Path;

/// Trait for fetching one playlist entry into a scratch directory
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch `source_url` as `format`, writing output files into
    /// `scratch_dir`.
    ///
    /// A successful return means the tool exited cleanly; it does not
    /// guarantee a usable media file appeared (the orchestrator checks).
    /// Errors are item-local: the orchestrator records them and moves on.
    async fn fetch(&self, source_url: &str, format: MediaFormat, scratch_dir: &Path)
    -> Result<()>;

    /// Whether the external tooling needed for `format` is present.
    ///
    /// Consulted once before a job starts; both formats require the
    /// transcoder.
    fn is_available(&self, format: MediaFormat) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
