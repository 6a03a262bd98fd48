//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::profile::EncodeProfile;

/// A single stream descriptor reported by ffprobe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Stream type ("audio", "video", "subtitle", ...).
    pub codec_type: String,
    /// Codec name, if ffprobe reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
}

/// Container metadata for one audio file.
///
/// Tag keys are stored lower-cased, so lookups are case-insensitive with
/// respect to how the source file spelled them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// File path.
    pub path: PathBuf,
    /// Container format (e.g., "flac", "mov").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// Streams in container order.
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
    tags: BTreeMap<String, String>,
}

impl Metadata {
    /// Creates empty metadata for a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Adds a tag, normalizing the key to lower case.
    pub fn with_tag(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_tag(key, value);
        self
    }

    /// Adds a stream descriptor.
    pub fn with_stream(mut self, codec_type: impl Into<String>, codec_name: Option<&str>) -> Self {
        self.streams.push(StreamInfo {
            codec_type: codec_type.into(),
            codec_name: codec_name.map(str::to_string),
        });
        self
    }

    /// Inserts a tag, normalizing the key to lower case.
    pub fn insert_tag(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.tags
            .insert(key.as_ref().to_lowercase(), value.into());
    }

    /// Looks up a tag by name, ignoring case.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(&key.to_lowercase()).map(String::as_str)
    }

    /// All tags, keyed by lower-cased name.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the file carries a video stream (usually embedded cover art).
    pub fn has_video(&self) -> bool {
        self.streams.iter().any(|s| s.codec_type == "video")
    }
}

/// A conversion job: one input file, one output file, one resolved profile.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Input file path.
    pub input_path: PathBuf,
    /// Output file path, already carrying the codec's extension.
    pub output_path: PathBuf,
    /// Resolved encode parameters.
    pub profile: EncodeProfile,
    /// Report the invocation instead of running it.
    pub dry_run: bool,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
}

/// A fully built external command: program plus argument vector.
///
/// Arguments are handed to the process spawner as-is. The `Display`
/// implementation quotes them for humans only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Arguments as lossy UTF-8 strings.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
}
