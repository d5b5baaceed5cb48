use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::cipher::aes128_ecb_decrypt;
use crate::error::{NcmError, Result};

/// AES key for the metadata block. Fixed for the format, distinct from the
/// key-block cipher key.
const META_KEY: [u8; 16] = [
    0x23, 0x31, 0x34, 0x6C, 0x6A, 0x6B, 0x5F, 0x21, 0x5C, 0x5D, 0x26, 0x30, 0x55, 0x3C, 0x27, 0x28,
];

/// XOR constant applied to the metadata block.
const META_XOR: u8 = 0x63;

/// ASCII label prepended to the base64 payload.
const META_LABEL: &[u8] = b"163 key(Don't modify):";

/// Plaintext prefix preceding the JSON body.
const META_PREFIX: &[u8] = b"music:";

/// Track description recovered from the container's metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackMetadata {
    #[serde(rename = "musicName", default)]
    pub music_name: String,
    #[serde(default)]
    pub album: String,
    /// `[["Name", id], ...]` — ordered, names first.
    #[serde(default)]
    pub artist: Vec<Vec<serde_json::Value>>,
    #[serde(rename = "musicId", default)]
    pub music_id: Option<u64>,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub duration: Option<u64>,
    /// Source format hint ("mp3"/"flac"); the sniffer, not this field, decides
    /// the output container.
    #[serde(default)]
    pub format: Option<String>,
}

impl TrackMetadata {
    /// Join artist names with " / ".
    pub fn artist_names(&self) -> String {
        self.artist
            .iter()
            .filter_map(|a| a.first().and_then(|v| v.as_str()))
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Ordered (name, id) pairs, skipping malformed entries.
    pub fn artists(&self) -> Vec<(String, Option<u64>)> {
        self.artist
            .iter()
            .filter_map(|a| {
                let name = a.first()?.as_str()?.to_string();
                let id = a.get(1).and_then(serde_json::Value::as_u64);
                Some((name, id))
            })
            .collect()
    }
}

/// Decode the metadata block into a `TrackMetadata`.
///
/// An empty block means the container carries no metadata and yields
/// `Ok(None)`. Label/base64/cipher failures surface as `Decrypt`/`Base64`
/// errors, malformed JSON after a correct decryption as `Json`.
pub fn decode_metadata(block: &[u8]) -> Result<Option<TrackMetadata>> {
    if block.is_empty() {
        return Ok(None);
    }

    let mut data = block.to_vec();
    for b in &mut data {
        *b ^= META_XOR;
    }

    let b64 = data
        .strip_prefix(META_LABEL)
        .ok_or_else(|| NcmError::Decrypt("missing metadata label".into()))?;
    let decoded = BASE64.decode(b64)?;
    let plain = aes128_ecb_decrypt(&META_KEY, &decoded)?;
    let json = plain
        .strip_prefix(META_PREFIX)
        .ok_or_else(|| NcmError::Decrypt("missing metadata prefix".into()))?;

    Ok(Some(serde_json::from_slice(json)?))
}
