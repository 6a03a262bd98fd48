//! Types for the processor module.

use std::fmt;
use std::path::PathBuf;

use crate::converter::ConversionResult;
use crate::profile::{Codec, ProfileOptions};

use super::error::JobError;

/// Everything a run needs to know, fixed before the first job starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Root of the tree to scan.
    pub input_root: PathBuf,
    /// Root of the mirrored output tree.
    pub output_root: PathBuf,
    /// Target codec.
    pub codec: Codec,
    /// Profile options (compatibility mode, lyrics).
    pub options: ProfileOptions,
    /// Report invocations instead of running them.
    pub dry_run: bool,
}

/// Terminal state of one job.
#[derive(Debug)]
pub enum JobOutcome {
    /// Dry run: the command that would have been executed.
    DryRun { command: String },
    /// Output already existed; nothing was done.
    Skipped,
    /// Conversion finished.
    Succeeded(ConversionResult),
    /// Conversion did not happen or did not finish.
    Failed(JobError),
}

impl JobOutcome {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DryRun { .. } => "dry_run",
            Self::Skipped => "skipped",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What happened to one input file.
#[derive(Debug)]
pub struct JobReport {
    /// Input file.
    pub input_path: PathBuf,
    /// Output file the job targeted.
    pub output_path: PathBuf,
    /// Terminal state.
    pub outcome: JobOutcome,
}

impl JobReport {
    /// Whether the job failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, JobOutcome::Failed(_))
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&JobError> {
        match &self.outcome {
            JobOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One report per discovered file, in completion order.
    pub reports: Vec<JobReport>,
    /// Jobs whose task panicked; these have no report.
    pub aborted: usize,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

impl RunSummary {
    fn count(&self, label: &str) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }

    /// Jobs that produced an output file.
    pub fn succeeded(&self) -> usize {
        self.count("succeeded")
    }

    /// Jobs skipped because the output existed.
    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    /// Jobs only reported (dry run).
    pub fn dry_runs(&self) -> usize {
        self.count("dry_run")
    }

    /// Jobs that failed, including aborted tasks.
    pub fn failed(&self) -> usize {
        self.count("failed") + self.aborted
    }

    /// Total jobs accounted for.
    pub fn total(&self) -> usize {
        self.reports.len() + self.aborted
    }

    /// Failed reports.
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.reports.iter().filter(|r| r.is_failure())
    }

    /// Whether the run should exit non-zero.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} converted, {} skipped, {} dry-run, {} failed",
            self.total(),
            self.succeeded(),
            self.skipped(),
            self.dry_runs(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterError;

    fn report(name: &str, outcome: JobOutcome) -> JobReport {
        JobReport {
            input_path: PathBuf::from(format!("/in/{}.flac", name)),
            output_path: PathBuf::from(format!("/out/{}.mp3", name)),
            outcome,
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            reports: vec![
                report(
                    "a",
                    JobOutcome::Succeeded(ConversionResult {
                        output_path: PathBuf::from("/out/a.mp3"),
                        output_size_bytes: 10,
                        duration_ms: 5,
                    }),
                ),
                report("b", JobOutcome::Skipped),
                report("c", JobOutcome::Skipped),
                report(
                    "d",
                    JobOutcome::Failed(JobError::Probe {
                        path: PathBuf::from("/in/d.flac"),
                        source: ConverterError::probe_failed("bad header"),
                    }),
                ),
            ],
            aborted: 0,
            elapsed_ms: 42,
        };

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.dry_runs(), 0);
        assert_eq!(summary.failed(), 1);
        assert!(summary.has_failures());
        assert_eq!(
            summary.to_string(),
            "4 files: 1 converted, 2 skipped, 0 dry-run, 1 failed"
        );

        let failed: Vec<_> = summary.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].error().map(JobError::kind), Some("probe"));
    }

    #[test]
    fn test_aborted_tasks_count_as_failures() {
        let summary = RunSummary {
            aborted: 1,
            ..Default::default()
        };
        assert_eq!(summary.total(), 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_empty_summary_is_clean() {
        let summary = RunSummary::default();
        assert!(!summary.has_failures());
        assert_eq!(summary.total(), 0);
    }
}
