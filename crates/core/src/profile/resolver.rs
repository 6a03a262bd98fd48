//! Codec profile resolution.

use crate::converter::{AacEncoder, Metadata};

use super::codec::Codec;
use super::types::{AudioSettings, ContainerSettings, EncodeProfile, ProfileOptions, VideoDirective};

/// Tags that survive re-encoding, in the order they are written.
pub const ALLOWED_TAGS: [&str; 7] = ["title", "artist", "album", "date", "track", "genre", "disc"];

/// Extra tag kept when lyrics preservation is enabled.
pub const LYRICS_TAG: &str = "lyrics";

/// Sample rate forced by compatibility mode.
const COMPAT_SAMPLE_RATE_HZ: u32 = 44_100;

/// How a codec treats video streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VideoPolicy {
    /// Copy when the source has video.
    Copy,
    /// Always drop.
    Drop,
    /// Leave to ffmpeg.
    Untouched,
}

/// Resolves per-file encode profiles for one run.
///
/// The codec, options and AAC encoder choice are fixed for the run; only the
/// per-file metadata varies between calls to [`ProfileResolver::resolve`].
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    codec: Codec,
    options: ProfileOptions,
    aac_encoder: AacEncoder,
}

impl ProfileResolver {
    /// Creates a resolver. `aac_encoder` comes from the run's one-time
    /// capability probe and is ignored for other codecs.
    pub fn new(codec: Codec, options: ProfileOptions, aac_encoder: AacEncoder) -> Self {
        Self {
            codec,
            options,
            aac_encoder,
        }
    }

    /// Builds the profile for one file.
    pub fn resolve(&self, metadata: &Metadata) -> EncodeProfile {
        let (audio, video_policy, container) = self.codec_table();

        let video = match video_policy {
            VideoPolicy::Copy if metadata.has_video() => Some(VideoDirective::Copy),
            VideoPolicy::Copy | VideoPolicy::Untouched => None,
            VideoPolicy::Drop => Some(VideoDirective::Drop),
        };

        EncodeProfile {
            codec: self.codec,
            tags: self.allowed_tags(metadata),
            audio,
            video,
            container,
        }
    }

    fn allowed_tags(&self, metadata: &Metadata) -> Vec<(String, String)> {
        let lyrics = self.options.preserve_lyrics.then_some(LYRICS_TAG);

        ALLOWED_TAGS
            .iter()
            .copied()
            .chain(lyrics)
            .filter_map(|key| metadata.tag(key).map(|value| (key.to_string(), value.to_string())))
            .collect()
    }

    fn codec_table(&self) -> (AudioSettings, VideoPolicy, ContainerSettings) {
        let compat = self.options.compatibility;
        let compat_container = ContainerSettings {
            faststart: compat,
            clear_audio_disposition: compat,
        };

        match self.codec {
            Codec::Flac => (
                AudioSettings::encoder("flac"),
                VideoPolicy::Copy,
                ContainerSettings::default(),
            ),
            Codec::Alac => (
                AudioSettings {
                    sample_format: compat.then_some("s16p"),
                    sample_rate_hz: compat.then_some(COMPAT_SAMPLE_RATE_HZ),
                    ..AudioSettings::encoder("alac")
                },
                VideoPolicy::Copy,
                compat_container,
            ),
            Codec::Aac => (
                AudioSettings {
                    bitrate_kbps: Some(256),
                    sample_rate_hz: compat.then_some(COMPAT_SAMPLE_RATE_HZ),
                    ..AudioSettings::encoder(self.aac_encoder.ffmpeg_codec())
                },
                VideoPolicy::Copy,
                compat_container,
            ),
            Codec::Wav => (
                AudioSettings::encoder("pcm_s16le"),
                VideoPolicy::Drop,
                ContainerSettings::default(),
            ),
            Codec::Opus => (
                AudioSettings {
                    bitrate_kbps: Some(128),
                    ..AudioSettings::encoder("libopus")
                },
                VideoPolicy::Drop,
                ContainerSettings::default(),
            ),
            Codec::Mp3 => (
                AudioSettings {
                    vbr_quality: Some(0),
                    ..AudioSettings::encoder("libmp3lame")
                },
                VideoPolicy::Untouched,
                ContainerSettings::default(),
            ),
        }
    }
}
