//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;

use super::capabilities::EncoderCapabilities;
use super::error::ConverterError;
use super::types::{ConversionJob, ConversionResult, Invocation, Metadata};

/// Audio container extensions picked up from the input tree.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "opus", "m4a", "ogg"];

/// An external engine that can probe and transcode media files.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Reads container tags and stream descriptors of a file.
    async fn probe(&self, path: &Path) -> Result<Metadata, ConverterError>;

    /// Lists the encoders the engine offers.
    async fn encoder_capabilities(&self) -> Result<EncoderCapabilities, ConverterError>;

    /// The exact command `convert` would run for this job.
    fn invocation(&self, job: &ConversionJob) -> Invocation;

    /// Runs the conversion. The output directory must already exist.
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;

    /// File extensions (lower case, no dot) treated as audio input.
    fn supported_input_formats(&self) -> &[&str] {
        AUDIO_EXTENSIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::AacEncoder;
    use crate::profile::{Codec, ProfileOptions, ProfileResolver};
    use std::ffi::OsString;
    use std::path::PathBuf;

    struct EchoConverter;

    #[async_trait]
    impl Converter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn probe(&self, path: &Path) -> Result<Metadata, ConverterError> {
            Ok(Metadata::new(path).with_stream("audio", Some("flac")))
        }

        async fn encoder_capabilities(&self) -> Result<EncoderCapabilities, ConverterError> {
            Ok(EncoderCapabilities::default())
        }

        fn invocation(&self, job: &ConversionJob) -> Invocation {
            Invocation {
                program: PathBuf::from("echo"),
                args: vec![job.output_path.clone().into_os_string()],
            }
        }

        async fn convert(&self, job: &ConversionJob) -> Result<ConversionResult, ConverterError> {
            Ok(ConversionResult {
                output_path: job.output_path.clone(),
                output_size_bytes: 0,
                duration_ms: 0,
            })
        }

        async fn validate(&self) -> Result<(), ConverterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_converter_roundtrip_through_trait_object() {
        let converter: Box<dyn Converter> = Box::new(EchoConverter);
        let metadata = converter.probe(Path::new("/in/a.flac")).await.unwrap();
        assert!(!metadata.has_video());

        let resolver =
            ProfileResolver::new(Codec::Wav, ProfileOptions::default(), AacEncoder::Native);
        let profile = resolver.resolve(&metadata);
        let job = ConversionJob {
            input_path: PathBuf::from("/in/a.flac"),
            output_path: PathBuf::from("/out/a.wav"),
            profile,
            dry_run: false,
        };

        assert_eq!(
            converter.invocation(&job).args,
            vec![OsString::from("/out/a.wav")]
        );
        let result = converter.convert(&job).await.unwrap();
        assert_eq!(result.output_path, PathBuf::from("/out/a.wav"));
    }

    #[test]
    fn test_supported_formats() {
        let converter = EchoConverter;
        let formats = converter.supported_input_formats();
        assert!(formats.contains(&"flac"));
        assert!(formats.contains(&"ogg"));
        assert!(!formats.contains(&"txt"));
    }
}
