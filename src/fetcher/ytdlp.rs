//! yt-dlp backed media fetching
//!
//! One yt-dlp invocation per entry, writing into the job's scratch
//! directory. Audio jobs extract and transcode to MP3; video jobs pick the
//! best video+audio streams and mux into MP4. Both paths run FFmpeg under
//! the hood, so availability requires yt-dlp and FFmpeg.

use super::MediaFetcher;
use crate::config::{Config, ToolsConfig};
use crate::error::{Error, Result};
use crate::tools;
use crate::types::MediaFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

/// Output template: stable numeric prefix, then the entry title
const OUTPUT_TEMPLATE: &str = "%(autonumber)05d - %(title)s.%(ext)s";

/// Fetcher that shells out to the yt-dlp binary
pub struct YtDlpFetcher {
    tools: ToolsConfig,
    audio_bitrate_kbps: u32,
    // Tool locations don't change mid-process; resolve once per instance.
    ytdlp: OnceLock<Option<PathBuf>>,
    ffmpeg: OnceLock<Option<PathBuf>>,
}

impl YtDlpFetcher {
    /// Create a fetcher with explicit tool settings
    pub fn new(tools: ToolsConfig, audio_bitrate_kbps: u32) -> Self {
        Self {
            tools,
            audio_bitrate_kbps,
            ytdlp: OnceLock::new(),
            ffmpeg: OnceLock::new(),
        }
    }

    /// Create a fetcher from the library configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tools.clone(), config.audio_bitrate_kbps)
    }

    fn ytdlp_path(&self) -> Option<&Path> {
        self.ytdlp
            .get_or_init(|| {
                tools::find_tool(
                    self.tools.ytdlp_path.as_deref(),
                    "yt-dlp",
                    self.tools.search_path,
                )
            })
            .as_deref()
    }

    fn ffmpeg_path(&self) -> Option<&Path> {
        self.ffmpeg
            .get_or_init(|| {
                tools::find_tool(
                    self.tools.ffmpeg_path.as_deref(),
                    "ffmpeg",
                    self.tools.search_path,
                )
            })
            .as_deref()
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        source_url: &str,
        format: MediaFormat,
        scratch_dir: &Path,
    ) -> Result<()> {
        let Some(binary) = self.ytdlp_path() else {
            return Err(Error::ToolUnavailable { format });
        };

        let mut command = Command::new(binary);
        command
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--quiet")
            .arg("--output")
            .arg(scratch_dir.join(OUTPUT_TEMPLATE));

        if let Some(ffmpeg) = self.ffmpeg_path() {
            command.arg("--ffmpeg-location").arg(ffmpeg);
        }

        match format {
            MediaFormat::Audio => {
                command
                    .arg("--format")
                    .arg("bestaudio/best")
                    .arg("--extract-audio")
                    .arg("--audio-format")
                    .arg("mp3")
                    .arg("--audio-quality")
                    .arg(format!("{}K", self.audio_bitrate_kbps));
            }
            MediaFormat::Video => {
                command
                    .arg("--format")
                    .arg("bv*+ba/best")
                    .arg("--merge-output-format")
                    .arg("mp4");
            }
        }
        command.arg(source_url);

        debug!(url = %source_url, %format, scratch = %scratch_dir.display(), "fetching entry");
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
            return Err(Error::Fetch(reason));
        }
        Ok(())
    }

    fn is_available(&self, _format: MediaFormat) -> bool {
        // Audio extraction and video muxing both transcode through FFmpeg
        self.ytdlp_path().is_some() && self.ffmpeg_path().is_some()
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
