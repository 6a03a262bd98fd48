//! Conversion executor: runs one job to a terminal state.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::converter::{ConversionJob, Converter};

use super::error::JobError;
use super::types::{JobOutcome, JobReport};

/// Runs single conversion jobs against a converter.
pub struct ConversionExecutor<C: Converter> {
    converter: Arc<C>,
}

impl<C: Converter> Clone for ConversionExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
        }
    }
}

/// Whether something already sits at `path`.
pub(crate) async fn output_exists(path: &Path) -> bool {
    matches!(tokio::fs::try_exists(path).await, Ok(true))
}

impl<C: Converter> ConversionExecutor<C> {
    /// Creates an executor sharing the given converter.
    pub fn new(converter: Arc<C>) -> Self {
        Self { converter }
    }

    /// Executes a job.
    ///
    /// Dry runs only report the command. Otherwise an existing output is
    /// skipped, never overwritten; a failed conversion leaves whatever ffmpeg
    /// wrote in place.
    pub async fn execute(&self, job: ConversionJob) -> JobReport {
        let outcome = self.run(&job).await;
        JobReport {
            input_path: job.input_path,
            output_path: job.output_path,
            outcome,
        }
    }

    async fn run(&self, job: &ConversionJob) -> JobOutcome {
        if job.dry_run {
            let command = self.converter.invocation(job).to_string();
            info!(
                input = %job.input_path.display(),
                output = %job.output_path.display(),
                "[DRY RUN] {}",
                command
            );
            return JobOutcome::DryRun { command };
        }

        if output_exists(&job.output_path).await {
            info!(output = %job.output_path.display(), "Skipping (exists)");
            return JobOutcome::Skipped;
        }

        if let Some(parent) = job.output_path.parent() {
            // create_dir_all tolerates siblings creating the same parents.
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                let err = JobError::OutputDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                };
                error!(input = %job.input_path.display(), error = %err, "Job failed");
                return JobOutcome::Failed(err);
            }
        }

        info!(input = %job.input_path.display(), "Converting");

        match self.converter.convert(job).await {
            Ok(result) => {
                info!(
                    output = %result.output_path.display(),
                    size_bytes = result.output_size_bytes,
                    duration_ms = result.duration_ms,
                    "Completed"
                );
                JobOutcome::Succeeded(result)
            }
            Err(e) => {
                let err = JobError::Conversion {
                    path: job.input_path.clone(),
                    source: e,
                };
                error!(input = %job.input_path.display(), error = %err, "Job failed");
                if let Some(stderr) = err.diagnostics() {
                    debug!(input = %job.input_path.display(), "ffmpeg output:\n{}", stderr);
                }
                JobOutcome::Failed(err)
            }
        }
    }
}
