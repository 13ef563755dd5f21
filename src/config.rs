//! Configuration types for playlist-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool paths (yt-dlp, FFmpeg)
///
/// Groups settings for the external binaries the production resolver and
/// fetcher shell out to. Explicit paths take precedence over PATH search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to the FFmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for [`PlaylistDownloader`](crate::PlaylistDownloader)
///
/// Works out of the box with zero configuration: scratch space defaults to
/// the system temp directory and external tools are discovered on PATH.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory under which per-job scratch directories are created
    /// (system temp directory if None)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Audio bitrate passed to the transcoder for audio jobs, in kbit/s (default: 192)
    #[serde(default = "default_audio_bitrate_kbps")]
    pub audio_bitrate_kbps: u32,

    /// Item cap applied automatically to auto-generated mix playlists when
    /// the caller does not supply one (default: 250)
    ///
    /// Mixes can report thousands of entries; an uncapped job on one would
    /// effectively never finish.
    #[serde(default = "default_mix_item_cap")]
    pub mix_item_cap: usize,

    /// Event broadcast channel capacity (default: 256)
    ///
    /// Slow subscribers that fall more than this many events behind start
    /// observing lagged receives; job state itself is never affected.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// External tool paths and discovery behavior
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            audio_bitrate_kbps: default_audio_bitrate_kbps(),
            mix_item_cap: default_mix_item_cap(),
            event_capacity: default_event_capacity(),
            tools: ToolsConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_audio_bitrate_kbps() -> u32 {
    192
}

fn default_mix_item_cap() -> usize {
    250
}

fn default_event_capacity() -> usize {
    256
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = Config::default();
        assert!(config.scratch_dir.is_none());
        assert_eq!(config.audio_bitrate_kbps, 192);
        assert_eq!(config.mix_item_cap, 250);
        assert_eq!(config.event_capacity, 256);
        assert!(config.tools.ytdlp_path.is_none());
        assert!(config.tools.ffmpeg_path.is_none());
        assert!(config.tools.search_path);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.audio_bitrate_kbps, 192);
        assert_eq!(config.mix_item_cap, 250);
        assert_eq!(config.event_capacity, 256);
        assert!(config.tools.search_path);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config: Config = serde_json::from_str(
            r#"{
                "mix_item_cap": 50,
                "tools": { "ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.mix_item_cap, 50);
        assert_eq!(
            config.tools.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        // Untouched fields keep their defaults
        assert_eq!(config.audio_bitrate_kbps, 192);
        assert!(config.tools.ytdlp_path.is_none());
        assert!(config.tools.search_path);
    }

    #[test]
    fn config_round_trips_through_json() {
        let original = Config {
            scratch_dir: Some(PathBuf::from("/var/tmp/playlist-dl")),
            audio_bitrate_kbps: 256,
            mix_item_cap: 100,
            event_capacity: 64,
            tools: ToolsConfig {
                ytdlp_path: Some(PathBuf::from("/usr/local/bin/yt-dlp")),
                ffmpeg_path: None,
                search_path: false,
            },
        };
        let json = serde_json::to_string(&original).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scratch_dir, original.scratch_dir);
        assert_eq!(back.audio_bitrate_kbps, original.audio_bitrate_kbps);
        assert_eq!(back.mix_item_cap, original.mix_item_cap);
        assert_eq!(back.event_capacity, original.event_capacity);
        assert_eq!(back.tools.ytdlp_path, original.tools.ytdlp_path);
        assert!(!back.tools.search_path);
    }
}
