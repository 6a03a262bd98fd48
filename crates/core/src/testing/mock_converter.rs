//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{
    ConversionJob, ConversionResult, Converter, ConverterError, EncoderCapabilities, Invocation,
    Metadata,
};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Clones share state, so a test can keep one handle while the dispatcher
/// owns another. Successful conversions write a small placeholder file at
/// the job's output path; failed ones write nothing.
///
/// # Example
///
/// ```rust,ignore
/// use tunemirror_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_conversion("/music/broken.flac").await;
///
/// let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter.clone());
/// dispatcher.run(&plan).await?;
///
/// assert_eq!(converter.conversion_count().await, 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Pre-configured probe results by path.
    probe_results: Arc<RwLock<HashMap<PathBuf, Metadata>>>,
    /// Inputs whose probe fails.
    probe_failures: Arc<RwLock<HashSet<PathBuf>>>,
    /// Inputs whose conversion fails.
    conversion_failures: Arc<RwLock<HashSet<PathBuf>>>,
    /// Encoders reported by `encoder_capabilities`.
    capabilities: Arc<RwLock<EncoderCapabilities>>,
    /// If set, the next capability query fails with this error.
    capability_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration in milliseconds.
    conversion_duration_ms: Arc<RwLock<u64>>,
    probes: Arc<AtomicUsize>,
    capability_probes: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            probe_results: Arc::new(RwLock::new(HashMap::new())),
            probe_failures: Arc::new(RwLock::new(HashSet::new())),
            conversion_failures: Arc::new(RwLock::new(HashSet::new())),
            capabilities: Arc::new(RwLock::new(EncoderCapabilities::from_names(["aac"]))),
            capability_error: Arc::new(RwLock::new(None)),
            conversion_duration_ms: Arc::new(RwLock::new(0)),
            probes: Arc::new(AtomicUsize::new(0)),
            capability_probes: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Set a probe result for a specific path.
    pub async fn set_probe_result(&self, path: impl AsRef<Path>, metadata: Metadata) {
        self.probe_results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), metadata);
    }

    /// Make probing `path` fail.
    pub async fn fail_probe(&self, path: impl AsRef<Path>) {
        self.probe_failures
            .write()
            .await
            .insert(path.as_ref().to_path_buf());
    }

    /// Make converting `path` fail with diagnostics.
    pub async fn fail_conversion(&self, path: impl AsRef<Path>) {
        self.conversion_failures
            .write()
            .await
            .insert(path.as_ref().to_path_buf());
    }

    /// Set the encoders reported by capability queries.
    pub async fn set_capabilities(&self, capabilities: EncoderCapabilities) {
        *self.capabilities.write().await = capabilities;
    }

    /// Make the next capability query fail.
    pub async fn set_capability_error(&self, error: ConverterError) {
        *self.capability_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Number of probe calls.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Number of capability queries.
    pub fn capability_probe_count(&self) -> usize {
        self.capability_probes.load(Ordering::SeqCst)
    }

    /// Highest number of conversions observed running at once.
    pub fn max_concurrent_conversions(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn record(&self, job: &ConversionJob, success: bool) {
        self.conversions.write().await.push(RecordedConversion {
            job: job.clone(),
            success,
        });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<Metadata, ConverterError> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if self.probe_failures.read().await.contains(path) {
            return Err(ConverterError::probe_failed(format!(
                "{}: Invalid data found when processing input",
                path.display()
            )));
        }

        if let Some(metadata) = self.probe_results.read().await.get(path) {
            return Ok(metadata.clone());
        }

        Ok(Metadata::new(path).with_stream("audio", None))
    }

    async fn encoder_capabilities(&self) -> Result<EncoderCapabilities, ConverterError> {
        self.capability_probes.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.capability_error.write().await.take() {
            return Err(err);
        }
        Ok(self.capabilities.read().await.clone())
    }

    fn invocation(&self, job: &ConversionJob) -> Invocation {
        let mut args: Vec<OsString> = vec!["-i".into(), job.input_path.clone().into_os_string()];
        args.extend(job.profile.to_ffmpeg_args().into_iter().map(OsString::from));
        args.push(job.output_path.clone().into_os_string());

        Invocation {
            program: PathBuf::from("mock-ffmpeg"),
            args,
        }
    }

    async fn convert(&self, job: &ConversionJob) -> Result<ConversionResult, ConverterError> {
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(running, Ordering::SeqCst);

        let duration_ms = *self.conversion_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let failing = self.conversion_failures.read().await.contains(&job.input_path);
        let result = if failing {
            Err(ConverterError::conversion_failed(
                "ffmpeg exited with status 1",
                Some(format!(
                    "{}: Invalid data found when processing input",
                    job.input_path.display()
                )),
            ))
        } else {
            tokio::fs::write(&job.output_path, b"mock")
                .await
                .map(|_| ConversionResult {
                    output_path: job.output_path.clone(),
                    output_size_bytes: 4,
                    duration_ms,
                })
                .map_err(ConverterError::from)
        };

        self.record(job, result.is_ok()).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::AacEncoder;
    use crate::profile::{Codec, ProfileOptions, ProfileResolver};
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn job(input: &Path, output: PathBuf) -> ConversionJob {
        let resolver =
            ProfileResolver::new(Codec::Opus, ProfileOptions::default(), AacEncoder::Native);
        let profile = resolver.resolve(&Metadata::new(input));
        ConversionJob {
            input_path: input.to_path_buf(),
            output_path: output,
            profile,
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_convert_writes_output() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        let output = dir.path().join("a.opus");

        let result = converter
            .convert(&job(Path::new("/in/a.flac"), output.clone()))
            .await
            .unwrap();

        assert_eq!(result.output_path, output);
        assert_eq!(std::fs::read(&output).unwrap(), b"mock");

        let recorded = converter.recorded_conversions().await;
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].success);
    }

    #[tokio::test]
    async fn test_conversion_failure_injection() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        converter.fail_conversion("/in/bad.flac").await;
        let output = dir.path().join("bad.opus");

        let err = converter
            .convert(&job(Path::new("/in/bad.flac"), output.clone()))
            .await
            .unwrap_err();

        assert!(err.diagnostics().is_some());
        assert!(!output.exists());
        assert!(!converter.recorded_conversions().await[0].success);
    }

    #[tokio::test]
    async fn test_probe_results() {
        let converter = MockConverter::new();
        converter
            .set_probe_result("/in/a.flac", Metadata::new("/in/a.flac").with_tag("title", "A"))
            .await;
        converter.fail_probe("/in/b.flac").await;

        let a = converter.probe(Path::new("/in/a.flac")).await.unwrap();
        assert_eq!(a.tag("title"), Some("A"));
        assert_err!(converter.probe(Path::new("/in/b.flac")).await);

        let c = converter.probe(Path::new("/in/c.flac")).await.unwrap();
        assert_eq!(c.streams.len(), 1);
        assert!(!c.has_video());

        assert_eq!(converter.probe_count(), 3);
    }

    #[tokio::test]
    async fn test_capability_error_is_one_shot() {
        let converter = MockConverter::new();
        converter
            .set_capability_error(ConverterError::probe_failed("boom"))
            .await;

        assert_err!(converter.encoder_capabilities().await);
        let caps = assert_ok!(converter.encoder_capabilities().await);
        assert_eq!(caps.aac_encoder(), AacEncoder::Native);
        assert_eq!(converter.capability_probe_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        let other = converter.clone();

        other
            .convert(&job(Path::new("/in/a.flac"), dir.path().join("a.opus")))
            .await
            .unwrap();

        assert_eq!(converter.conversion_count().await, 1);
        assert_eq!(converter.max_concurrent_conversions(), 1);
    }
}
