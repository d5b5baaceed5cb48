use crate::cipher::Keystream;
use crate::error::{NcmError, Result};
use crate::key::unwrap_key;
use crate::metadata::{TrackMetadata, decode_metadata};
use crate::reader::ByteReader;

/// NCM file magic: "CTENFDAM".
const NCM_MAGIC: [u8; 8] = [0x43, 0x54, 0x45, 0x4E, 0x46, 0x44, 0x41, 0x4D];

/// Chunk size for in-place audio decryption. Performance choice only; the
/// keystream is position-addressed, so any chunking gives identical output.
const DECRYPT_CHUNK: usize = 0x8000;

/// Parsed NCM container with the audio tail still encrypted.
///
/// Metadata and cover are best-effort: a block that is present but
/// undecodable leaves its field `None` and records the failure in the
/// matching `*_error` slot instead of failing the parse. Magic mismatch and
/// structural truncation of the required sections are hard errors.
pub struct NcmContainer {
    pub metadata: Option<TrackMetadata>,
    pub metadata_error: Option<NcmError>,
    pub cover: Option<Vec<u8>>,
    pub cover_error: Option<NcmError>,
    keystream: Keystream,
    cipher_text: Vec<u8>,
}

impl NcmContainer {
    /// Parse the container layout and unwrap the stream-cipher key.
    ///
    /// Layout: magic (8) + gap (2) + key block (u32 len + bytes) + metadata
    /// block (u32 len + bytes) + CRC (4) + gap (1) + cover frame (u32 frame
    /// len + u32 image len + image + padding) + encrypted audio tail.
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        let mut r = ByteReader::new(bytes);

        // A file too short to hold the magic is not an NCM file either.
        let magic = r.read_exact(8).map_err(|_| NcmError::InvalidMagic)?;
        if magic != NCM_MAGIC {
            return Err(NcmError::InvalidMagic);
        }
        r.skip(2)?;

        let key_len = r.read_u32_le()? as usize;
        if key_len == 0 {
            return Err(NcmError::KeyRecovery("empty key block".into()));
        }
        let key = unwrap_key(r.read_exact(key_len)?)?;
        let keystream = Keystream::schedule(key.as_bytes());

        let meta_len = r.read_u32_le()? as usize;
        let meta_block = r.read_exact(meta_len)?;
        let (metadata, metadata_error) = match decode_metadata(meta_block) {
            Ok(meta) => (meta, None),
            Err(e) => (None, Some(e)),
        };

        // CRC (4) + gap (1), both unused.
        r.skip(5)?;

        let cover_frame_len = r.read_u32_le()? as usize;
        let image_len = r.read_u32_le()? as usize;
        let (cover, cover_error) = read_cover(&mut r, cover_frame_len, image_len);

        Ok(Self {
            metadata,
            metadata_error,
            cover,
            cover_error,
            keystream,
            cipher_text: r.into_remaining(),
        })
    }

    pub fn audio_len(&self) -> usize {
        self.cipher_text.len()
    }

    /// Decrypt the audio tail, consuming the cipher text.
    ///
    /// Cannot detect a wrong key by itself; garbage output is caught by the
    /// caller when sniffing the result fails.
    pub fn decrypt_audio(&mut self) -> Vec<u8> {
        let mut buf = std::mem::take(&mut self.cipher_text);
        let mut offset = 0;
        for chunk in buf.chunks_mut(DECRYPT_CHUNK) {
            let len = chunk.len();
            self.keystream.apply(chunk, offset);
            offset += len;
        }
        buf
    }
}

/// Read the cover image, tolerating a corrupt length field.
///
/// A declared length exceeding the remaining bytes cannot be honored without
/// consuming the audio tail, so the cover is dropped, the failure recorded,
/// and the cursor left where it is.
fn read_cover(
    r: &mut ByteReader,
    frame_len: usize,
    image_len: usize,
) -> (Option<Vec<u8>>, Option<NcmError>) {
    if image_len == 0 {
        // No image; the frame may still carry padding to skip.
        if frame_len > 0 {
            if let Err(e) = r.skip(frame_len) {
                return (None, Some(e));
            }
        }
        return (None, None);
    }

    if image_len > r.remaining_len() {
        return (
            None,
            Some(NcmError::Truncated {
                needed: image_len,
                available: r.remaining_len(),
            }),
        );
    }
    let image = r
        .read_exact(image_len)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();

    // Padding up to the declared frame length.
    let padding = frame_len.saturating_sub(image_len);
    if padding > 0 {
        if let Err(e) = r.skip(padding) {
            return (Some(image), Some(e));
        }
    }
    (Some(image), None)
}
