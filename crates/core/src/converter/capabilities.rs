//! Encoder capability detection.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Encoders advertised by an ffmpeg build, as listed by `ffmpeg -encoders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderCapabilities {
    encoders: BTreeSet<String>,
}

/// Which AAC encoder a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AacEncoder {
    /// AudioToolbox encoder, only present on Apple builds.
    AudioToolbox,
    /// FFmpeg's native encoder.
    #[default]
    Native,
}

impl AacEncoder {
    /// Returns the ffmpeg encoder name.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::AudioToolbox => "aac_at",
            Self::Native => "aac",
        }
    }
}

impl EncoderCapabilities {
    /// Builds capabilities from a list of encoder names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            encoders: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the output of `ffmpeg -encoders`.
    ///
    /// Encoder rows look like ` A....D aac_at    AAC (AudioToolbox)`: a six
    /// character flag column followed by the encoder name. The legend at the
    /// top of the listing uses the same flag shape with `=` as the name, so it
    /// is filtered out.
    pub fn parse_encoder_list(output: &str) -> Self {
        let row = match Regex::new(r"^\s*[VASFXBD.]{6}\s+([A-Za-z0-9_-]+)\s") {
            Ok(re) => re,
            Err(_) => return Self::default(),
        };

        Self {
            encoders: output
                .lines()
                .filter_map(|line| row.captures(line))
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    /// Whether the named encoder is available.
    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }

    /// The best AAC encoder this build offers.
    pub fn aac_encoder(&self) -> AacEncoder {
        if self.has_encoder(AacEncoder::AudioToolbox.ffmpeg_codec()) {
            AacEncoder::AudioToolbox
        } else {
            AacEncoder::Native
        }
    }

    /// Number of encoders detected.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Whether no encoders were detected.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
