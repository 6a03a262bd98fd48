//! Converter module: the boundary to the external ffmpeg/ffprobe engine.
//!
//! This module provides the `Converter` trait and an FFmpeg-backed
//! implementation covering the three things a run needs from the engine:
//!
//! - Probing a file for its container tags and stream list (ffprobe JSON)
//! - Listing the available encoders once per run
//! - Running one conversion from a structured argument vector
//!
//! # Example
//!
//! ```ignore
//! use tunemirror_core::converter::{Converter, ConverterConfig, FfmpegConverter};
//!
//! let converter = FfmpegConverter::new(ConverterConfig::with_ffmpeg("/opt/ffmpeg/bin/ffmpeg"));
//! converter.validate().await?;
//!
//! let metadata = converter.probe(Path::new("/music/a.flac")).await?;
//! println!("artist: {:?}", metadata.tag("artist"));
//!
//! let aac = converter.encoder_capabilities().await?.aac_encoder();
//! println!("aac encoder: {}", aac.ffmpeg_codec());
//! ```

mod capabilities;
mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use capabilities::{AacEncoder, EncoderCapabilities};
pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::{Converter, AUDIO_EXTENSIONS};
pub use types::{ConversionJob, ConversionResult, Invocation, Metadata, StreamInfo};
