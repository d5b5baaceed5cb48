//! NCM decoding engine: parses the encrypted container produced by the cloud
//! music client, recovers the audio stream and track metadata, and writes a
//! standard MP3/FLAC file with tags and cover art.
//!
//! The single entry point for callers is [`dump`]; lower-level access to a
//! parsed container is available through [`NcmContainer`].

mod cipher;
mod container;
mod dumper;
pub mod error;
mod format;
mod key;
mod metadata;
mod reader;
mod tag;

pub use container::NcmContainer;
pub use dumper::{DumpCode, DumpOptions, DumpOutcome, dump, dump_with};
pub use error::{NcmError, Result};
pub use format::AudioFormat;
pub use metadata::TrackMetadata;
pub use tag::TagStrategy;
