//! Encode profile resolution.
//!
//! Maps a target [`Codec`] plus [`ProfileOptions`] and one file's
//! [`Metadata`](crate::converter::Metadata) to an [`EncodeProfile`]: the
//! stream mapping, the tags to re-inject, the audio encoder settings and the
//! video/container directives for a single ffmpeg run.
//!
//! # Example
//!
//! ```ignore
//! use tunemirror_core::converter::{AacEncoder, Metadata};
//! use tunemirror_core::profile::{Codec, ProfileOptions, ProfileResolver};
//!
//! let resolver = ProfileResolver::new(Codec::Mp3, ProfileOptions::default(), AacEncoder::Native);
//! let metadata = Metadata::new("/in/a.flac").with_tag("Artist", "X");
//!
//! let profile = resolver.resolve(&metadata);
//! assert_eq!(profile.tag("artist"), Some("X"));
//! ```

mod codec;
mod error;
mod resolver;
mod types;

pub use codec::Codec;
pub use error::ProfileError;
pub use resolver::{ProfileResolver, ALLOWED_TAGS, LYRICS_TAG};
pub use types::{AudioSettings, ContainerSettings, EncodeProfile, ProfileOptions, VideoDirective};
