//! Command-line surface.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use tunemirror_core::Codec;

/// Mirror an audio library into another codec.
#[derive(Debug, Parser)]
#[command(name = "tunemirror", version)]
#[command(about = "Batch-transcode an audio tree with ffmpeg, mirroring its layout")]
pub struct Cli {
    /// Directory to scan for audio files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Root of the mirrored output tree
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target codec: flac, alac, aac, wav, mp3 or opus
    #[arg(short, long, value_parser = Codec::from_str)]
    pub codec: Option<Codec>,

    /// ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable (default: next to ffmpeg)
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// Print the ffmpeg commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Device-compatibility mode; implies aac when no codec is given
    #[arg(long, alias = "ipod")]
    pub compat: bool,

    /// Keep the lyrics tag
    #[arg(long)]
    pub preserve_lyrics: bool,

    /// Number of parallel conversions (default: available CPUs)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// TOML config file
    #[arg(long, env = "TUNEMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// The top configuration layer built from flags.
///
/// Absent flags serialize to nothing so file and environment values survive.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    codec: Option<Codec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatibility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preserve_lyrics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
    #[serde(skip_serializing_if = "ConverterOverrides::is_empty")]
    converter: ConverterOverrides,
    #[serde(skip_serializing_if = "ProcessorOverrides::is_empty")]
    processor: ProcessorOverrides,
}

#[derive(Debug, Default, Serialize)]
struct ConverterOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    ffmpeg_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ffprobe_path: Option<PathBuf>,
}

impl ConverterOverrides {
    fn is_empty(&self) -> bool {
        self.ffmpeg_path.is_none() && self.ffprobe_path.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
struct ProcessorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_workers: Option<usize>,
}

impl ProcessorOverrides {
    fn is_empty(&self) -> bool {
        self.max_workers.is_none()
    }
}

impl Cli {
    /// Flags as a configuration layer.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            codec: self.codec,
            compatibility: self.compat.then_some(true),
            preserve_lyrics: self.preserve_lyrics.then_some(true),
            dry_run: self.dry_run.then_some(true),
            converter: ConverterOverrides {
                ffmpeg_path: self.ffmpeg.clone(),
                ffprobe_path: self.ffprobe.clone(),
            },
            processor: ProcessorOverrides {
                max_workers: self.workers,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunemirror_core::load_config;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "tunemirror",
            "--input",
            "/music",
            "--output",
            "/ipod",
            "--codec",
            "ALAC",
            "--ipod",
            "--dry-run",
            "-j",
            "3",
            "--ffmpeg",
            "/opt/bin/ffmpeg",
        ])
        .unwrap();

        assert_eq!(cli.codec, Some(Codec::Alac));
        assert!(cli.compat);
        assert!(cli.dry_run);
        assert_eq!(cli.workers, Some(3));
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let result = Cli::try_parse_from(["tunemirror", "-i", "/a", "-o", "/b", "-c", "vorbis"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_feed_config() {
        let cli = Cli::try_parse_from([
            "tunemirror",
            "-i",
            "/music",
            "-o",
            "/out",
            "--compat",
            "--ffmpeg",
            "/opt/bin/ffmpeg",
            "-j",
            "2",
        ])
        .unwrap();

        let config = load_config(None, &cli.overrides()).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/music"));
        assert!(config.compatibility);
        assert!(!config.dry_run);
        assert_eq!(config.resolved_codec().unwrap(), Codec::Aac);
        assert_eq!(config.converter.ffmpeg_path, PathBuf::from("/opt/bin/ffmpeg"));
        assert_eq!(config.converter.ffprobe_path, None);
        assert_eq!(config.processor.max_workers, Some(2));
    }

    #[test]
    fn test_unset_flags_are_not_serialized() {
        let cli = Cli::try_parse_from(["tunemirror"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.converter.is_empty());
        assert!(overrides.processor.is_empty());
        assert_eq!(overrides.dry_run, None);
        assert_eq!(overrides.compatibility, None);
    }
}
