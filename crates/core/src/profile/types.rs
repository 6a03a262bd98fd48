//! Types for the profile module.

use serde::{Deserialize, Serialize};

use super::codec::Codec;

/// Options that perturb the per-codec profile table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOptions {
    /// Device compatibility mode: 16-bit/44.1 kHz, fast-start layout,
    /// cleared default-track disposition.
    #[serde(default)]
    pub compatibility: bool,
    /// Keep the `lyrics` tag in addition to the standard allow-list.
    #[serde(default)]
    pub preserve_lyrics: bool,
}

/// Audio encoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    /// FFmpeg encoder name.
    pub encoder: &'static str,
    /// Constant bitrate in kbps (lossy codecs).
    pub bitrate_kbps: Option<u32>,
    /// Variable bitrate quality (`-q:a`, 0 is best).
    pub vbr_quality: Option<u8>,
    /// Forced sample format.
    pub sample_format: Option<&'static str>,
    /// Forced sample rate in Hz.
    pub sample_rate_hz: Option<u32>,
}

impl AudioSettings {
    pub(crate) fn encoder(encoder: &'static str) -> Self {
        Self {
            encoder,
            bitrate_kbps: None,
            vbr_quality: None,
            sample_format: None,
            sample_rate_hz: None,
        }
    }
}

/// What happens to video streams (embedded cover art).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoDirective {
    /// Stream-copy video as-is (`-c:v copy`).
    Copy,
    /// Drop video entirely (`-vn`).
    Drop,
}

/// Container-level flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerSettings {
    /// Move the index to the front of the file (`-movflags +faststart`).
    pub faststart: bool,
    /// Clear the default-track disposition on the audio stream.
    pub clear_audio_disposition: bool,
}

/// The resolved parameter set for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeProfile {
    /// Target codec.
    pub codec: Codec,
    /// Tags to re-inject, lower-cased, in allow-list order.
    pub tags: Vec<(String, String)>,
    /// Audio encoder settings.
    pub audio: AudioSettings,
    /// Video handling, `None` leaves ffmpeg's default for the container.
    pub video: Option<VideoDirective>,
    /// Container flags.
    pub container: ContainerSettings,
}

impl EncodeProfile {
    /// Output file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        self.codec.extension()
    }

    /// Looks up a re-injected tag.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the profile as ffmpeg output options.
    ///
    /// Every input stream is mapped, all source metadata is dropped, and only
    /// the allow-listed tags are written back.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-map".to_string(),
            "0".to_string(),
            "-map_metadata".to_string(),
            "-1".to_string(),
        ];

        for (key, value) in &self.tags {
            args.extend(["-metadata".to_string(), format!("{}={}", key, value)]);
        }

        // Audio codec
        args.extend(["-c:a".to_string(), self.audio.encoder.to_string()]);

        if let Some(bitrate) = self.audio.bitrate_kbps {
            args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
        }
        if let Some(quality) = self.audio.vbr_quality {
            args.extend(["-q:a".to_string(), quality.to_string()]);
        }

        match self.video {
            Some(VideoDirective::Copy) => args.extend(["-c:v".to_string(), "copy".to_string()]),
            Some(VideoDirective::Drop) => args.push("-vn".to_string()),
            None => {}
        }

        if let Some(format) = self.audio.sample_format {
            args.extend(["-sample_fmt".to_string(), format.to_string()]);
        }
        if let Some(rate) = self.audio.sample_rate_hz {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }
        if self.container.faststart {
            args.extend(["-movflags".to_string(), "+faststart".to_string()]);
        }
        if self.container.clear_audio_disposition {
            args.extend(["-disposition:a".to_string(), "0".to_string()]);
        }

        args
    }
}
