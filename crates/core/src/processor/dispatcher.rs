//! Job dispatcher: discovery, per-file jobs, bounded worker pool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::converter::{AacEncoder, ConversionJob, Converter};
use crate::profile::{Codec, ProfileResolver};

use super::config::ProcessorConfig;
use super::discovery::{discover_audio_files, nested_output_root, output_path};
use super::error::{JobError, ProcessorError};
use super::executor::{output_exists, ConversionExecutor};
use super::types::{JobOutcome, JobReport, RunPlan, RunSummary};

/// Fans a run out over a fixed-size pool of workers.
pub struct Dispatcher<C: Converter> {
    config: ProcessorConfig,
    converter: Arc<C>,
}

/// Shared, read-only state handed to every job task.
struct JobContext<C: Converter> {
    converter: Arc<C>,
    executor: ConversionExecutor<C>,
    resolver: ProfileResolver,
    dry_run: bool,
}

impl<C: Converter + 'static> Dispatcher<C> {
    /// Creates a dispatcher owning the converter.
    pub fn new(config: ProcessorConfig, converter: C) -> Self {
        Self::with_shared(config, Arc::new(converter))
    }

    /// Creates a dispatcher sharing an existing converter.
    pub fn with_shared(config: ProcessorConfig, converter: Arc<C>) -> Self {
        Self { config, converter }
    }

    /// Pool size used for runs.
    pub fn worker_count(&self) -> usize {
        self.config.worker_count()
    }

    /// Runs every audio file under the plan's input root to a terminal state.
    ///
    /// Per-file failures are collected in the summary; only problems with the
    /// run as a whole (missing input root, unreadable tree) return `Err`.
    pub async fn run(&self, plan: &RunPlan) -> Result<RunSummary, ProcessorError> {
        let start = Instant::now();

        match tokio::fs::metadata(&plan.input_root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ProcessorError::InputNotDirectory {
                    path: plan.input_root.clone(),
                });
            }
            Err(_) => {
                return Err(ProcessorError::InputNotFound {
                    path: plan.input_root.clone(),
                });
            }
        }

        let files = {
            let root = plan.input_root.clone();
            let output_root = plan.output_root.clone();
            let extensions: Vec<String> = self
                .converter
                .supported_input_formats()
                .iter()
                .map(|e| e.to_string())
                .collect();
            tokio::task::spawn_blocking(move || {
                let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
                let exclude = nested_output_root(&root, &output_root);
                discover_audio_files(&root, exclude.as_deref(), &extensions)
            })
            .await??
        };

        if files.is_empty() {
            info!(input = %plan.input_root.display(), "No audio files found");
            return Ok(RunSummary {
                elapsed_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            });
        }

        let workers = self.worker_count();
        info!(
            files = files.len(),
            workers,
            codec = %plan.codec,
            dry_run = plan.dry_run,
            "Starting conversion run"
        );

        if !plan.dry_run {
            tokio::fs::create_dir_all(&plan.output_root)
                .await
                .map_err(|e| ProcessorError::OutputRootFailed {
                    path: plan.output_root.clone(),
                    source: e,
                })?;
        }

        let aac_encoder = self.detect_aac_encoder(plan.codec).await;
        let context = Arc::new(JobContext {
            converter: Arc::clone(&self.converter),
            executor: ConversionExecutor::new(Arc::clone(&self.converter)),
            resolver: ProfileResolver::new(plan.codec, plan.options, aac_encoder),
            dry_run: plan.dry_run,
        });

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for input in files {
            let output = output_path(&plan.input_root, &plan.output_root, &input, plan.codec);

            // Blocks submission until a worker slot frees up.
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| ProcessorError::PoolClosed)?;

            let context = Arc::clone(&context);
            tasks.spawn(async move {
                let _permit = permit;
                match output {
                    Some(output) => Self::process_file(&context, input, output).await,
                    None => JobReport {
                        output_path: PathBuf::new(),
                        outcome: JobOutcome::Failed(JobError::OutsideInputRoot {
                            path: input.clone(),
                        }),
                        input_path: input,
                    },
                }
            });
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!(error = %e, "Job task aborted");
                    summary.aborted += 1;
                }
            }
        }

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            succeeded = summary.succeeded(),
            skipped = summary.skipped(),
            dry_run = summary.dry_runs(),
            failed = summary.failed(),
            elapsed_ms = summary.elapsed_ms,
            "Conversion run finished"
        );

        Ok(summary)
    }

    /// One capability probe per run, and only when the run targets AAC.
    async fn detect_aac_encoder(&self, codec: Codec) -> AacEncoder {
        if codec != Codec::Aac {
            return AacEncoder::default();
        }

        match self.converter.encoder_capabilities().await {
            Ok(caps) if caps.is_empty() => {
                warn!("ffmpeg listed no encoders, using native AAC encoder");
                AacEncoder::default()
            }
            Ok(caps) => {
                let encoder = caps.aac_encoder();
                info!(
                    encoder = encoder.ffmpeg_codec(),
                    available = caps.len(),
                    "Selected AAC encoder"
                );
                encoder
            }
            Err(e) => {
                warn!(error = %e, "Encoder detection failed, using native AAC encoder");
                AacEncoder::default()
            }
        }
    }

    /// Probe, resolve, execute.
    async fn process_file(context: &JobContext<C>, input: PathBuf, output: PathBuf) -> JobReport {
        // Existing outputs are skipped without spending a probe on them.
        if !context.dry_run && output_exists(&output).await {
            info!(output = %output.display(), "Skipping (exists)");
            return JobReport {
                input_path: input,
                output_path: output,
                outcome: JobOutcome::Skipped,
            };
        }

        let metadata = match context.converter.probe(&input).await {
            Ok(metadata) => metadata,
            Err(e) => {
                let err = JobError::Probe {
                    path: input.clone(),
                    source: e,
                };
                error!(input = %input.display(), error = %err, "Job failed");
                return JobReport {
                    input_path: input,
                    output_path: output,
                    outcome: JobOutcome::Failed(err),
                };
            }
        };

        let job = ConversionJob {
            profile: context.resolver.resolve(&metadata),
            input_path: input,
            output_path: output,
            dry_run: context.dry_run,
        };

        context.executor.execute(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConverterError, EncoderCapabilities, Metadata};
    use crate::profile::ProfileOptions;
    use crate::testing::MockConverter;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"audio").unwrap();
        path
    }

    fn plan(dir: &TempDir, codec: Codec, dry_run: bool) -> RunPlan {
        RunPlan {
            input_root: dir.path().join("in"),
            output_root: dir.path().join("out"),
            codec,
            options: ProfileOptions::default(),
            dry_run,
        }
    }

    #[tokio::test]
    async fn test_missing_input_root() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), MockConverter::new());

        let err = dispatcher.run(&plan(&dir, Codec::Flac, false)).await.unwrap_err();
        assert!(matches!(err, ProcessorError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_input_root_is_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("in"), b"not a dir").unwrap();
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), MockConverter::new());

        let err = dispatcher.run(&plan(&dir, Codec::Flac, false)).await.unwrap_err();
        assert!(matches!(err, ProcessorError::InputNotDirectory { .. }));
    }

    #[tokio::test]
    async fn test_empty_tree_is_a_clean_run() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("in"), "notes.txt");
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), MockConverter::new());

        let summary = assert_ok!(dispatcher.run(&plan(&dir, Codec::Mp3, false)).await);
        assert_eq!(summary.total(), 0);
        assert!(!summary.has_failures());
    }

    #[tokio::test]
    async fn test_aac_capability_probed_once() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        for i in 0..5 {
            touch(&input, &format!("disc1/{:02}.flac", i));
        }

        let converter = MockConverter::new();
        converter
            .set_capabilities(EncoderCapabilities::from_names(["aac", "aac_at"]))
            .await;
        let dispatcher =
            Dispatcher::new(ProcessorConfig::default().with_max_workers(2), converter.clone());

        let summary = dispatcher.run(&plan(&dir, Codec::Aac, false)).await.unwrap();
        assert_eq!(summary.succeeded(), 5);
        assert_eq!(converter.capability_probe_count(), 1);

        for conversion in converter.recorded_conversions().await {
            assert_eq!(conversion.job.profile.audio.encoder, "aac_at");
        }
    }

    #[tokio::test]
    async fn test_no_capability_probe_for_other_codecs() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("in"), "a.mp3");

        let converter = MockConverter::new();
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter.clone());
        dispatcher.run(&plan(&dir, Codec::Opus, false)).await.unwrap();

        assert_eq!(converter.capability_probe_count(), 0);
    }

    #[tokio::test]
    async fn test_capability_probe_failure_falls_back() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("in"), "a.flac");

        let converter = MockConverter::new();
        converter
            .set_capability_error(ConverterError::FfmpegNotFound {
                path: PathBuf::from("ffmpeg"),
            })
            .await;
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter.clone());

        let summary = dispatcher.run(&plan(&dir, Codec::Aac, false)).await.unwrap();
        assert_eq!(summary.succeeded(), 1);
        let recorded = converter.recorded_conversions().await;
        assert_eq!(recorded[0].job.profile.audio.encoder, "aac");
    }

    #[tokio::test]
    async fn test_empty_encoder_listing_falls_back() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("in"), "a.flac");

        let converter = MockConverter::new();
        converter
            .set_capabilities(EncoderCapabilities::default())
            .await;
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter.clone());

        let summary = dispatcher.run(&plan(&dir, Codec::Aac, false)).await.unwrap();
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(converter.capability_probe_count(), 1);
        let recorded = converter.recorded_conversions().await;
        assert_eq!(recorded[0].job.profile.audio.encoder, "aac");
    }

    #[tokio::test]
    async fn test_pool_never_exceeds_worker_count() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        for i in 0..12 {
            touch(&input, &format!("track{:02}.wav", i));
        }

        let converter = MockConverter::new();
        converter
            .set_conversion_duration(Duration::from_millis(20))
            .await;
        let dispatcher =
            Dispatcher::new(ProcessorConfig::default().with_max_workers(3), converter.clone());

        let summary = dispatcher.run(&plan(&dir, Codec::Flac, false)).await.unwrap();
        assert_eq!(summary.succeeded(), 12);
        assert!(converter.max_concurrent_conversions() <= 3);
        assert!(converter.max_concurrent_conversions() >= 1);
    }

    #[tokio::test]
    async fn test_existing_output_skipped_without_probe() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("in"), "album/a.flac");
        touch(&dir.path().join("out"), "album/a.mp3");

        let converter = MockConverter::new();
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter.clone());

        let summary = dispatcher.run(&plan(&dir, Codec::Mp3, false)).await.unwrap();
        assert_eq!(summary.skipped(), 1);
        assert_eq!(converter.probe_count(), 0);
        assert_eq!(converter.conversion_count().await, 0);
    }

    #[tokio::test]
    async fn test_probe_metadata_flows_into_profile() {
        let dir = TempDir::new().unwrap();
        let input = touch(&dir.path().join("in"), "a.flac");

        let converter = MockConverter::new();
        converter
            .set_probe_result(
                &input,
                Metadata::new(&input)
                    .with_tag("Artist", "X")
                    .with_tag("Genre", "Jazz")
                    .with_tag("Comment", "dropped"),
            )
            .await;
        let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter.clone());

        dispatcher.run(&plan(&dir, Codec::Mp3, false)).await.unwrap();

        let recorded = converter.recorded_conversions().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].job.output_path, dir.path().join("out").join("a.mp3"));
        assert_eq!(
            recorded[0].job.profile.tags,
            vec![
                ("artist".to_string(), "X".to_string()),
                ("genre".to_string(), "Jazz".to_string()),
            ]
        );
    }
}
