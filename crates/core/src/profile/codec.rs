//! Target codec selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ProfileError;

/// Target audio codec for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Free Lossless Audio Codec
    Flac,
    /// Apple Lossless, in an MP4 container
    Alac,
    /// Advanced Audio Coding, in an MP4 container
    Aac,
    /// WAVE (uncompressed PCM)
    Wav,
    /// MPEG Audio Layer III
    Mp3,
    /// Opus
    Opus,
}

impl Codec {
    /// Every supported codec.
    pub const ALL: [Codec; 6] = [
        Codec::Flac,
        Codec::Alac,
        Codec::Aac,
        Codec::Wav,
        Codec::Mp3,
        Codec::Opus,
    ];

    /// Returns the canonical output file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Alac => "m4a",
            Self::Aac => "m4a",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
        }
    }

    /// Lower-case name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Alac => "alac",
            Self::Aac => "aac",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ProfileError::UnsupportedCodec(s.to_string()))
    }
}
