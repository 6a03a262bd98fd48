//! Error types for the processor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;

/// Errors that stop a whole run before or during dispatch.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The input root does not exist.
    #[error("Input directory does not exist: {path}")]
    InputNotFound { path: PathBuf },

    /// The input root is not a directory.
    #[error("Input path is not a directory: {path}")]
    InputNotDirectory { path: PathBuf },

    /// The output root could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    OutputRootFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Walking the input tree failed.
    #[error("Failed to scan input directory: {0}")]
    Discovery(#[from] walkdir::Error),

    /// A background task could not complete.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The worker pool was shut down while jobs were being submitted.
    #[error("Worker pool closed")]
    PoolClosed,
}

/// Why a single job failed. Never aborts sibling jobs.
#[derive(Debug, Error)]
pub enum JobError {
    /// Metadata extraction failed; the file is not converted.
    #[error("Failed to probe {path}: {source}")]
    Probe {
        path: PathBuf,
        source: ConverterError,
    },

    /// Output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The encoder exited non-zero, timed out, or could not be started.
    #[error("Conversion failed for {path}: {source}")]
    Conversion {
        path: PathBuf,
        source: ConverterError,
    },

    /// The file does not live under the input root.
    #[error("File is outside the input directory: {path}")]
    OutsideInputRoot { path: PathBuf },
}

impl JobError {
    /// Diagnostic text from the external process, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Conversion { source, .. } => source.diagnostics(),
            _ => None,
        }
    }

    /// Short label for summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Probe { .. } => "probe",
            Self::OutputDirectory { .. } => "output_directory",
            Self::Conversion { .. } => "conversion",
            Self::OutsideInputRoot { .. } => "path",
        }
    }
}
