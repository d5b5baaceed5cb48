use std::path::Path;

use lofty::config::WriteOptions;
use lofty::id3::v2::Id3v2Tag;
use lofty::ogg::{OggPictureStorage, VorbisComments};
use lofty::picture::{MimeType, Picture, PictureInformation, PictureType};
use lofty::tag::{Accessor, TagExt};

use crate::error::{NcmError, Result};
use crate::format::AudioFormat;
use crate::metadata::TrackMetadata;

/// PNG magic bytes for MIME detection.
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Tagging convention for a detected container.
///
/// MP3 gets ID3v2 frames ahead of the frame stream; FLAC gets Vorbis comment
/// and picture metadata blocks. The two are independent strategies picked by
/// the sniffer's result; they share no layout. Each builds its container's
/// concrete tag type, which keeps frame/field order insertion-defined: the
/// same inputs always serialize to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStrategy {
    Id3Frames,
    FlacBlocks,
}

impl TagStrategy {
    pub fn for_format(format: AudioFormat) -> Self {
        match format {
            AudioFormat::Mp3 => Self::Id3Frames,
            AudioFormat::Flac => Self::FlacBlocks,
        }
    }

    /// Inject title/artist/album and cover art into the written audio file.
    ///
    /// No-op when there is nothing to write.
    pub fn write(
        self,
        path: &Path,
        metadata: Option<&TrackMetadata>,
        cover: Option<&[u8]>,
    ) -> Result<()> {
        if metadata.is_none() && cover.is_none() {
            return Ok(());
        }

        match self {
            Self::Id3Frames => {
                let mut tag = Id3v2Tag::default();
                if let Some(meta) = metadata {
                    set_text_fields(&mut tag, meta);
                }
                if let Some(img_data) = cover {
                    tag.insert_picture(build_picture(img_data));
                }
                tag.save_to_path(path, WriteOptions::default())
                    .map_err(|e| NcmError::Tag(e.to_string()))
            }
            Self::FlacBlocks => {
                let mut tag = VorbisComments::default();
                if let Some(meta) = metadata {
                    set_text_fields(&mut tag, meta);
                }
                if let Some(img_data) = cover {
                    // Zeroed dimensions are valid in a picture block and keep
                    // the writer from re-parsing the image data.
                    tag.insert_picture(
                        build_picture(img_data),
                        Some(PictureInformation::default()),
                    )
                    .map_err(|e| NcmError::Tag(e.to_string()))?;
                }
                tag.save_to_path(path, WriteOptions::default())
                    .map_err(|e| NcmError::Tag(e.to_string()))
            }
        }
    }
}

fn set_text_fields<T: Accessor>(tag: &mut T, meta: &TrackMetadata) {
    tag.set_title(meta.music_name.clone());
    tag.set_artist(meta.artist_names());
    tag.set_album(meta.album.clone());
}

fn build_picture(img_data: &[u8]) -> Picture {
    let mime = if img_data.starts_with(&PNG_MAGIC) {
        MimeType::Png
    } else {
        MimeType::Jpeg
    };
    Picture::unchecked(img_data.to_vec())
        .pic_type(PictureType::CoverFront)
        .mime_type(mime)
        .build()
}
