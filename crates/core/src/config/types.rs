use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::processor::{ProcessorConfig, RunPlan};
use crate::profile::{Codec, ProfileOptions};

use super::ConfigError;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Tree to scan for audio files.
    pub input_dir: PathBuf,
    /// Root of the mirrored output tree.
    pub output_dir: PathBuf,
    /// Target codec. Optional only in compatibility mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<Codec>,
    /// Device-compatibility mode.
    #[serde(default, alias = "ipod")]
    pub compatibility: bool,
    /// Keep the `lyrics` tag.
    #[serde(default)]
    pub preserve_lyrics: bool,
    /// Print commands instead of running them.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
}

impl Config {
    /// Minimal configuration for the given directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            codec: None,
            compatibility: false,
            preserve_lyrics: false,
            dry_run: false,
            converter: ConverterConfig::default(),
            processor: ProcessorConfig::default(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_compatibility(mut self, compatibility: bool) -> Self {
        self.compatibility = compatibility;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The codec a run will target.
    ///
    /// Compatibility mode without an explicit codec means AAC.
    pub fn resolved_codec(&self) -> Result<Codec, ConfigError> {
        match (self.codec, self.compatibility) {
            (Some(codec), _) => Ok(codec),
            (None, true) => Ok(Codec::Aac),
            (None, false) => Err(ConfigError::ValidationError(format!(
                "codec is required unless compatibility mode is set (one of: {})",
                Codec::ALL
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            compatibility: self.compatibility,
            preserve_lyrics: self.preserve_lyrics,
        }
    }

    /// Freezes the configuration into a plan for the dispatcher.
    pub fn run_plan(&self) -> Result<RunPlan, ConfigError> {
        Ok(RunPlan {
            input_root: self.input_dir.clone(),
            output_root: self.output_dir.clone(),
            codec: self.resolved_codec()?,
            options: self.profile_options(),
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_codec_wins() {
        let config = Config::new("/in", "/out")
            .with_codec(Codec::Alac)
            .with_compatibility(true);
        assert_eq!(config.resolved_codec().unwrap(), Codec::Alac);
    }

    #[test]
    fn test_compatibility_defaults_to_aac() {
        let config = Config::new("/in", "/out").with_compatibility(true);
        assert_eq!(config.resolved_codec().unwrap(), Codec::Aac);
    }

    #[test]
    fn test_missing_codec_fails() {
        let err = Config::new("/in", "/out").resolved_codec().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("opus"));
    }

    #[test]
    fn test_run_plan() {
        let mut config = Config::new("/music", "/ipod")
            .with_compatibility(true)
            .with_dry_run(true);
        config.preserve_lyrics = true;

        let plan = config.run_plan().unwrap();
        assert_eq!(plan.input_root, PathBuf::from("/music"));
        assert_eq!(plan.output_root, PathBuf::from("/ipod"));
        assert_eq!(plan.codec, Codec::Aac);
        assert!(plan.options.compatibility);
        assert!(plan.options.preserve_lyrics);
        assert!(plan.dry_run);
    }

    #[test]
    fn test_ipod_alias() {
        let config: Config = toml::from_str(
            r#"
input_dir = "/in"
output_dir = "/out"
ipod = true
"#,
        )
        .unwrap();
        assert!(config.compatibility);
        assert_eq!(config.codec, None);
    }
}
