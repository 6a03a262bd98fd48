//! Testing utilities and mock implementations.
//!
//! The mock converter lets the dispatcher run end to end against a temp
//! directory without ffmpeg installed.

mod mock_converter;

pub use mock_converter::{MockConverter, RecordedConversion};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::converter::Metadata;

    /// Create a file with placeholder content, including parent directories.
    ///
    /// Panics if the file cannot be written.
    pub fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        std::fs::write(&path, b"audio").expect("Failed to write fixture file");
        path
    }

    /// Probe result for a tagged audio-only track.
    pub fn tagged_track(path: &Path, artist: &str, album: &str, title: &str) -> Metadata {
        Metadata::new(path)
            .with_stream("audio", Some("flac"))
            .with_tag("artist", artist)
            .with_tag("album", album)
            .with_tag("title", title)
    }

    /// Probe result for a track carrying embedded cover art.
    pub fn track_with_cover(path: &Path) -> Metadata {
        Metadata::new(path)
            .with_stream("audio", Some("flac"))
            .with_stream("video", Some("mjpeg"))
    }

}
