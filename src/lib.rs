//! # playlist-dl
//!
//! Background playlist download job orchestrator library.
//!
//! ## Design Philosophy
//!
//! playlist-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to typed job events, or poll
//!   snapshots; both work from any thread
//! - **One job at a time** - A single background job with cooperative
//!   cancellation; starting a second job while one runs is rejected
//! - **Pluggable engines** - Playlist resolution and media fetching are
//!   traits; the built-in implementations shell out to yt-dlp and FFmpeg
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_dl::{Config, MediaFormat, PlaylistDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = PlaylistDownloader::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let job_id = downloader
//!         .start(
//!             "https://www.youtube.com/playlist?list=PL123",
//!             MediaFormat::Audio,
//!             None,
//!         )
//!         .await?;
//!     println!("Job {job_id} running");
//!
//!     // ... later, from any thread:
//!     // downloader.cancel();
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Title slugs and bundle construction
pub mod archive;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Media fetch collaborator
pub mod fetcher;
/// Media file selection and classification
pub mod media;
/// Playlist entry resolution collaborator
pub mod resolver;
/// External binary discovery
pub mod tools;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, ToolsConfig};
pub use downloader::PlaylistDownloader;
pub use error::{Error, Result};
pub use fetcher::{MediaFetcher, YtDlpFetcher};
pub use resolver::{
    EntryResolver, PlaylistEntry, PlaylistMetadata, ResolvedPlaylist, YtDlpResolver,
};
pub use types::{
    Bundle, CompletedItem, FailedItem, JobEvent, JobId, JobSnapshot, MediaFormat, StatusLevel,
};
