//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while talking to the external ffmpeg/ffprobe binaries.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// An engine binary started but `-version` reported failure.
    #[error("{path} -version exited with code {code:?}")]
    EngineUnusable { path: PathBuf, code: Option<i32> },

    /// FFmpeg exited with a non-zero status.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Conversion timed out.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// FFprobe exited with a non-zero status.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error while spawning or waiting on a process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new conversion failed error with stderr output.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Diagnostic output captured from the external process, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ConversionFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// Whether the error means the engine itself is unusable, as opposed to
    /// a problem with one particular file.
    pub fn is_engine_missing(&self) -> bool {
        matches!(
            self,
            Self::FfmpegNotFound { .. } | Self::FfprobeNotFound { .. }
        )
    }
}
