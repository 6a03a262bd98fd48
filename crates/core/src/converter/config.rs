//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the FFmpeg-based converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to ffmpeg binary. A bare name is resolved through `PATH`.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary. Derived from `ffmpeg_path` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<PathBuf>,

    /// Timeout for a single conversion job in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional ffmpeg output arguments, placed right before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: None,
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_ffmpeg(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ..Default::default()
        }
    }

    /// Sets an explicit ffprobe path.
    pub fn with_ffprobe(mut self, ffprobe_path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = Some(ffprobe_path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The ffprobe binary to use.
    ///
    /// Without an explicit path, ffprobe is expected next to ffmpeg:
    /// `/opt/ff/bin/ffmpeg` gives `/opt/ff/bin/ffprobe`, and a bare `ffmpeg`
    /// gives a bare `ffprobe`.
    pub fn resolved_ffprobe_path(&self) -> PathBuf {
        if let Some(ref path) = self.ffprobe_path {
            return path.clone();
        }
        sibling_ffprobe(&self.ffmpeg_path)
    }
}

fn sibling_ffprobe(ffmpeg_path: &Path) -> PathBuf {
    let file_name = ffmpeg_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let probe_name = if file_name.contains("ffmpeg") {
        file_name.replacen("ffmpeg", "ffprobe", 1)
    } else {
        format!("ffprobe{}", std::env::consts::EXE_SUFFIX)
    };

    match ffmpeg_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(probe_name),
        _ => PathBuf::from(probe_name),
    }
}
