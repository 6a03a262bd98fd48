//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::capabilities::EncoderCapabilities;
use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionResult, Invocation, Metadata, StreamInfo};

/// Longest stderr excerpt attached to a conversion error.
const MAX_STDERR_BYTES: usize = 4096;

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
    ffprobe_path: PathBuf,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        let ffprobe_path = config.resolved_ffprobe_path();
        Self {
            config,
            ffprobe_path,
        }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Builds the ffmpeg argument vector for a job.
    fn build_args(&self, job: &ConversionJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-loglevel",
            self.config.ffmpeg_log_level.as_str(),
            // Never overwrite: existing outputs are skipped before we get here.
            "-n",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(job.input_path.clone().into_os_string());
        args.extend(job.profile.to_ffmpeg_args().into_iter().map(OsString::from));
        args.extend(self.config.extra_ffmpeg_args.iter().map(OsString::from));
        args.push(job.output_path.clone().into_os_string());

        args
    }

    /// Parses ffprobe JSON output into Metadata.
    fn parse_probe_output(path: &Path, output: &str) -> Result<Metadata, ConverterError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            format: Option<ProbeFormat>,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: Option<String>,
            duration: Option<String>,
            #[serde(default)]
            tags: BTreeMap<String, String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            #[serde(default)]
            codec_type: String,
            codec_name: Option<String>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| ConverterError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let mut metadata = Metadata::new(path);
        metadata.streams = probe
            .streams
            .into_iter()
            .map(|s| StreamInfo {
                codec_type: s.codec_type,
                codec_name: s.codec_name,
            })
            .collect();

        if let Some(format) = probe.format {
            metadata.format_name = format
                .format_name
                .as_deref()
                .and_then(|n| n.split(',').next())
                .map(str::to_string);
            metadata.duration_secs = format.duration.and_then(|d| d.parse::<f64>().ok());

            // BTreeMap order puts "ARTIST" before "artist", so a lower-case
            // spelling wins when a file carries both.
            for (key, value) in format.tags {
                metadata.insert_tag(key, value);
            }
        }

        Ok(metadata)
    }

    fn spawn_error(&self, e: std::io::Error, program: &Path, probe: bool) -> ConverterError {
        if e.kind() != std::io::ErrorKind::NotFound {
            return ConverterError::Io(e);
        }
        let path = program.to_path_buf();
        if probe {
            ConverterError::FfprobeNotFound { path }
        } else {
            ConverterError::FfmpegNotFound { path }
        }
    }
}

fn stderr_excerpt(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.len() <= MAX_STDERR_BYTES {
        return Some(text.to_string());
    }
    // Keep the tail, where ffmpeg reports the fatal error.
    let mut start = text.len() - MAX_STDERR_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    Some(text[start..].to_string())
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<Metadata, ConverterError> {
        if !path.exists() {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.ffprobe_path, true))?;

        if !output.status.success() {
            return Err(ConverterError::probe_failed(format!(
                "ffprobe exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn encoder_capabilities(&self) -> Result<EncoderCapabilities, ConverterError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffmpeg_path, false))?;

        if !output.status.success() {
            debug!(code = ?output.status.code(), "ffmpeg -encoders failed");
            return Ok(EncoderCapabilities::default());
        }

        Ok(EncoderCapabilities::parse_encoder_list(
            &String::from_utf8_lossy(&output.stdout),
        ))
    }

    fn invocation(&self, job: &ConversionJob) -> Invocation {
        Invocation {
            program: self.config.ffmpeg_path.clone(),
            args: self.build_args(job),
        }
    }

    async fn convert(&self, job: &ConversionJob) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();
        let invocation = self.invocation(job);

        debug!(command = %invocation, "Running ffmpeg");

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e, &self.config.ffmpeg_path, false))?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            // Dropping the future drops the child, which kills it.
            Err(_) => {
                return Err(ConverterError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            return Err(ConverterError::conversion_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                stderr_excerpt(&output.stderr),
            ));
        }

        let output_meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| ConverterError::conversion_failed("Output file not created", None))?;

        Ok(ConversionResult {
            output_path: job.output_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        for (program, probe) in [
            (&self.config.ffmpeg_path, false),
            (&self.ffprobe_path, true),
        ] {
            let output = Command::new(program)
                .arg("-version")
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| self.spawn_error(e, program, probe))?;

            if !output.status.success() {
                return Err(ConverterError::EngineUnusable {
                    path: program.to_path_buf(),
                    code: output.status.code(),
                });
            }
        }

        Ok(())
    }
}
