//! Error types for the profile module.

use thiserror::Error;

/// Errors that can occur while resolving an encode profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The codec name is not one of the supported targets.
    #[error("Unsupported codec: {0} (expected one of flac, alac, aac, wav, mp3, opus)")]
    UnsupportedCodec(String),
}
